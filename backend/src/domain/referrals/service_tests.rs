//! Tests for the referral policy service.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use mockall::predicate::eq;

use super::{Referral, ReferralPolicyPorts, ReferralPolicyService, ReferralTarget};
use crate::domain::ErrorCode;
use crate::domain::actors::{AgeClass, DoctorType, Examination};
use crate::domain::appointments::{Appointment, AppointmentTarget};
use crate::domain::ids::{
    DoctorId, DoctorTypeId, ExaminationId, HospitalId, PatientId, ReferralId,
};
use crate::domain::ports::{
    MockAppointmentRepository, MockDoctorTypeRepository, MockExaminationRepository,
    MockOpenAppointmentGate, MockReferralRepository,
};
use crate::test_support::FixedClock;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0)
        .single()
        .expect("valid time")
}

fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at(fixed_now()))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

struct Mocks {
    referrals: MockReferralRepository,
    appointments: MockAppointmentRepository,
    doctor_types: MockDoctorTypeRepository,
    examinations: MockExaminationRepository,
    gate: MockOpenAppointmentGate,
}

impl Default for Mocks {
    fn default() -> Self {
        Self {
            referrals: MockReferralRepository::new(),
            appointments: MockAppointmentRepository::new(),
            doctor_types: MockDoctorTypeRepository::new(),
            examinations: MockExaminationRepository::new(),
            gate: MockOpenAppointmentGate::new(),
        }
    }
}

impl Mocks {
    fn into_service(self) -> ReferralPolicyService {
        ReferralPolicyService::new(
            ReferralPolicyPorts {
                referrals: Arc::new(self.referrals),
                appointments: Arc::new(self.appointments),
                doctor_types: Arc::new(self.doctor_types),
                examinations: Arc::new(self.examinations),
                gate: Arc::new(self.gate),
            },
            fixed_clock(),
        )
    }
}

fn cardiology() -> DoctorType {
    DoctorType {
        id: DoctorTypeId::random(),
        name: "cardiologist".to_owned(),
        age_class: AgeClass::All,
    }
}

#[tokio::test]
async fn doctor_referral_requires_an_open_appointment() {
    let mut mocks = Mocks::default();
    mocks
        .gate
        .expect_have_open_appointment()
        .times(1)
        .returning(|_, _| Ok(false));
    mocks.referrals.expect_save().times(0);

    let service = mocks.into_service();
    let err = service
        .create_referral_for_doctor(DoctorId::random(), PatientId::random(), "cardiologist")
        .await
        .expect_err("missing open appointment rejected");
    assert_eq!(err.code(), ErrorCode::PreconditionFailed);
}

#[tokio::test]
async fn doctor_referral_rejects_the_family_doctor_specialty() {
    let mut mocks = Mocks::default();
    mocks
        .gate
        .expect_have_open_appointment()
        .returning(|_, _| Ok(true));
    mocks.referrals.expect_save().times(0);

    let service = mocks.into_service();
    let err = service
        .create_referral_for_doctor(DoctorId::random(), PatientId::random(), "Family Doctor")
        .await
        .expect_err("family specialty rejected");
    assert_eq!(err.code(), ErrorCode::PreconditionFailed);
}

#[tokio::test]
async fn doctor_referral_fails_for_unknown_specialty() {
    let mut mocks = Mocks::default();
    mocks
        .gate
        .expect_have_open_appointment()
        .returning(|_, _| Ok(true));
    mocks
        .doctor_types
        .expect_find_by_name()
        .times(1)
        .returning(|_| Ok(None));
    mocks.referrals.expect_save().times(0);

    let service = mocks.into_service();
    let err = service
        .create_referral_for_doctor(DoctorId::random(), PatientId::random(), "astrologist")
        .await
        .expect_err("unknown specialty rejected");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn doctor_referral_is_valid_for_one_year() {
    let doctor_id = DoctorId::random();
    let patient_id = PatientId::random();
    let specialty = cardiology();
    let specialty_id = specialty.id;

    let mut mocks = Mocks::default();
    mocks
        .gate
        .expect_have_open_appointment()
        .with(eq(doctor_id), eq(patient_id))
        .returning(|_, _| Ok(true));
    mocks
        .doctor_types
        .expect_find_by_name()
        .returning(move |_| Ok(Some(specialty.clone())));
    mocks.referrals.expect_save().times(1).returning(|_| Ok(()));

    let service = mocks.into_service();
    let referral = service
        .create_referral_for_doctor(doctor_id, patient_id, "cardiologist")
        .await
        .expect("referral issued");

    assert_eq!(referral.patient_id, patient_id);
    assert_eq!(referral.issuing_doctor_id, Some(doctor_id));
    assert_eq!(referral.target, ReferralTarget::DoctorType(specialty_id));
    assert_eq!(referral.issued_on, date(2026, 8, 5));
    assert_eq!(referral.expires_on, date(2027, 8, 5));
}

#[tokio::test]
async fn examination_referral_fails_for_unknown_examination() {
    let mut mocks = Mocks::default();
    mocks
        .gate
        .expect_have_open_appointment()
        .returning(|_, _| Ok(true));
    mocks
        .examinations
        .expect_find_by_name()
        .returning(|_| Ok(None));
    mocks.referrals.expect_save().times(0);

    let service = mocks.into_service();
    let err = service
        .create_referral_for_examination(DoctorId::random(), PatientId::random(), "aura scan")
        .await
        .expect_err("unknown examination rejected");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn examination_referral_targets_the_resolved_examination() {
    let examination = Examination {
        id: ExaminationId::random(),
        name: "blood panel".to_owned(),
    };
    let examination_id = examination.id;

    let mut mocks = Mocks::default();
    mocks
        .gate
        .expect_have_open_appointment()
        .returning(|_, _| Ok(true));
    mocks
        .examinations
        .expect_find_by_name()
        .returning(move |_| Ok(Some(examination.clone())));
    mocks.referrals.expect_save().times(1).returning(|_| Ok(()));

    let service = mocks.into_service();
    let referral = service
        .create_referral_for_examination(DoctorId::random(), PatientId::random(), "blood panel")
        .await
        .expect("referral issued");
    assert_eq!(referral.target, ReferralTarget::Examination(examination_id));
}

#[tokio::test]
async fn family_referral_skips_the_open_appointment_gate() {
    let patient_id = PatientId::random();
    let valid_from = date(2026, 9, 1);

    // No gate expectation is registered: a gate call would panic the test.
    let mut mocks = Mocks::default();
    mocks.doctor_types.expect_find_by_name().returning(|_| {
        Ok(Some(DoctorType {
            id: DoctorTypeId::random(),
            name: "family doctor".to_owned(),
            age_class: AgeClass::All,
        }))
    });
    mocks.referrals.expect_save().times(1).returning(|_| Ok(()));

    let service = mocks.into_service();
    let referral = service
        .create_referral_for_family_doctor(patient_id, valid_from)
        .await
        .expect("family referral issued");

    assert_eq!(referral.target, ReferralTarget::FamilyDoctor);
    assert_eq!(referral.issuing_doctor_id, None);
    assert_eq!(referral.issued_on, valid_from);
}

#[tokio::test]
async fn active_referrals_exclude_lapsed_and_consumed_entries() {
    let patient_id = PatientId::random();

    let fresh = Referral::issue(patient_id, None, ReferralTarget::FamilyDoctor, date(2026, 7, 1));
    let lapsed = Referral::issue(patient_id, None, ReferralTarget::FamilyDoctor, date(2024, 1, 1));
    let consumed = Referral::issue(patient_id, None, ReferralTarget::FamilyDoctor, date(2026, 6, 1));
    let missed_only =
        Referral::issue(patient_id, None, ReferralTarget::FamilyDoctor, date(2026, 5, 1));

    let fresh_id = fresh.id;
    let consumed_id = consumed.id;
    let missed_only_id = missed_only.id;

    let booked = |referral_id: ReferralId| {
        Appointment::create(
            patient_id,
            referral_id,
            date(2026, 8, 10),
            NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
            AppointmentTarget::Hospital(HospitalId::random()),
        )
    };
    let mut missed_appointment = booked(missed_only_id);
    missed_appointment.mark_missed().expect("miss allowed");

    let mut mocks = Mocks::default();
    {
        let listing = vec![
            fresh.clone(),
            lapsed.clone(),
            consumed.clone(),
            missed_only.clone(),
        ];
        mocks
            .referrals
            .expect_find_by_patient()
            .with(eq(patient_id))
            .returning(move |_| Ok(listing.clone()));
    }
    mocks
        .appointments
        .expect_find_by_referral()
        .with(eq(fresh_id))
        .returning(|_| Ok(Vec::new()));
    {
        let consumed_appointment = booked(consumed_id);
        mocks
            .appointments
            .expect_find_by_referral()
            .with(eq(consumed_id))
            .returning(move |_| Ok(vec![consumed_appointment.clone()]));
    }
    mocks
        .appointments
        .expect_find_by_referral()
        .with(eq(missed_only_id))
        .returning(move |_| Ok(vec![missed_appointment.clone()]));

    let service = mocks.into_service();
    let active = service
        .get_active_referrals(patient_id)
        .await
        .expect("listing succeeds");

    let ids: Vec<ReferralId> = active.iter().map(|referral| referral.id).collect();
    assert!(ids.contains(&fresh_id), "unconsumed referral stays active");
    assert!(
        ids.contains(&missed_only_id),
        "a missed appointment does not consume the referral"
    );
    assert_eq!(ids.len(), 2, "lapsed and consumed referrals are filtered");
}

#[tokio::test]
async fn delete_referral_is_idempotent() {
    let referral_id = ReferralId::random();

    let mut mocks = Mocks::default();
    mocks.referrals.expect_exists().returning(|_| Ok(false));
    mocks.referrals.expect_delete().times(0);

    let service = mocks.into_service();
    let deleted = service
        .delete_referral(referral_id)
        .await
        .expect("missing referral is a no-op");
    assert!(!deleted);
}

#[tokio::test]
async fn delete_referral_removes_existing_rows() {
    let referral_id = ReferralId::random();

    let mut mocks = Mocks::default();
    mocks.referrals.expect_exists().returning(|_| Ok(true));
    mocks
        .referrals
        .expect_delete()
        .with(eq(referral_id))
        .times(1)
        .returning(|_| Ok(true));

    let service = mocks.into_service();
    let deleted = service
        .delete_referral(referral_id)
        .await
        .expect("existing referral deleted");
    assert!(deleted);
}
