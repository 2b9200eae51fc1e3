//! Referral policy service.
//!
//! Decides when a referral may be issued and computes validity windows. The
//! open-appointment precondition goes through the same gate that medical
//! history access uses, so both stay in lockstep with appointment state.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use tracing::info;

use crate::domain::actors::FAMILY_DOCTOR_TYPE_NAME;
use crate::domain::appointments::AppointmentStatus;
use crate::domain::error::DomainError;
use crate::domain::ids::{DoctorId, PatientId, ReferralId};
use crate::domain::ports::{
    AppointmentRepository, DoctorTypeRepository, ExaminationRepository, FamilyReferralIssuer,
    OpenAppointmentGate, ReferralRepository, RepositoryError,
};

use super::{Referral, ReferralTarget};

/// Port bundle required by the referral policy service.
pub struct ReferralPolicyPorts {
    /// Referral persistence adapter.
    pub referrals: Arc<dyn ReferralRepository>,
    /// Appointment reads used for the consumption scan.
    pub appointments: Arc<dyn AppointmentRepository>,
    /// Specialty lookup adapter.
    pub doctor_types: Arc<dyn DoctorTypeRepository>,
    /// Examination lookup adapter.
    pub examinations: Arc<dyn ExaminationRepository>,
    /// Open-appointment capability gate.
    pub gate: Arc<dyn OpenAppointmentGate>,
}

/// Referral policy service.
pub struct ReferralPolicyService {
    referrals: Arc<dyn ReferralRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    doctor_types: Arc<dyn DoctorTypeRepository>,
    examinations: Arc<dyn ExaminationRepository>,
    gate: Arc<dyn OpenAppointmentGate>,
    clock: Arc<dyn Clock>,
}

impl ReferralPolicyService {
    /// Build the service from its port bundle and a clock.
    pub fn new(ports: ReferralPolicyPorts, clock: Arc<dyn Clock>) -> Self {
        Self {
            referrals: ports.referrals,
            appointments: ports.appointments,
            doctor_types: ports.doctor_types,
            examinations: ports.examinations,
            gate: ports.gate,
            clock,
        }
    }

    fn map_repository_error(error: RepositoryError) -> DomainError {
        match error {
            RepositoryError::Connection { message } | RepositoryError::Query { message } => {
                DomainError::internal(format!("referral repository error: {message}"))
            }
            RepositoryError::StaleVersion { expected, actual } => DomainError::conflict(format!(
                "referral changed concurrently (version {expected} vs {actual})"
            )),
        }
    }

    async fn require_open_appointment(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<(), DomainError> {
        if self
            .gate
            .have_open_appointment(doctor_id, patient_id)
            .await?
        {
            Ok(())
        } else {
            Err(DomainError::precondition_failed(
                "referral requires an open appointment between the doctor and the patient",
            ))
        }
    }

    /// Issue a referral towards a named doctor specialty.
    pub async fn create_referral_for_doctor(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
        target_type_name: &str,
    ) -> Result<Referral, DomainError> {
        self.require_open_appointment(doctor_id, patient_id).await?;

        if target_type_name.eq_ignore_ascii_case(FAMILY_DOCTOR_TYPE_NAME) {
            return Err(DomainError::precondition_failed(
                "family-doctor referrals are issued by signing a declaration",
            ));
        }

        let doctor_type = self
            .doctor_types
            .find_by_name(target_type_name)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("doctor specialty not found"))?;

        let referral = Referral::issue(
            patient_id,
            Some(doctor_id),
            ReferralTarget::DoctorType(doctor_type.id),
            self.clock.utc().date_naive(),
        );
        self.referrals
            .save(&referral)
            .await
            .map_err(Self::map_repository_error)?;
        info!(referral = %referral.id, patient = %patient_id, specialty = %doctor_type.name, "referral issued");
        Ok(referral)
    }

    /// Issue a referral towards a named examination.
    pub async fn create_referral_for_examination(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
        examination_name: &str,
    ) -> Result<Referral, DomainError> {
        self.require_open_appointment(doctor_id, patient_id).await?;

        let examination = self
            .examinations
            .find_by_name(examination_name)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("examination not found"))?;

        let referral = Referral::issue(
            patient_id,
            Some(doctor_id),
            ReferralTarget::Examination(examination.id),
            self.clock.utc().date_naive(),
        );
        self.referrals
            .save(&referral)
            .await
            .map_err(Self::map_repository_error)?;
        info!(referral = %referral.id, patient = %patient_id, examination = %examination.name, "referral issued");
        Ok(referral)
    }

    /// Issue a family-doctor referral valid from the given date.
    ///
    /// No open-appointment precondition applies; the declaration flow is the
    /// caller.
    pub async fn create_referral_for_family_doctor(
        &self,
        patient_id: PatientId,
        valid_from: NaiveDate,
    ) -> Result<Referral, DomainError> {
        self.doctor_types
            .find_by_name(FAMILY_DOCTOR_TYPE_NAME)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("family doctor specialty not found"))?;

        let referral = Referral::issue(patient_id, None, ReferralTarget::FamilyDoctor, valid_from);
        self.referrals
            .save(&referral)
            .await
            .map_err(Self::map_repository_error)?;
        info!(referral = %referral.id, patient = %patient_id, "family-doctor referral issued");
        Ok(referral)
    }

    /// Referrals still usable by the patient: inside the validity window and
    /// not yet consumed by a non-missed appointment.
    pub async fn get_active_referrals(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Referral>, DomainError> {
        let today = self.clock.utc().date_naive();
        let referrals = self
            .referrals
            .find_by_patient(patient_id)
            .await
            .map_err(Self::map_repository_error)?;

        let mut active = Vec::new();
        for referral in referrals {
            if !referral.is_valid_on(today) {
                continue;
            }
            if self.is_consumed(&referral).await? {
                continue;
            }
            active.push(referral);
        }
        Ok(active)
    }

    /// Unfiltered referral listing for administrative and history views.
    pub async fn get_all_referrals(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Referral>, DomainError> {
        self.referrals
            .find_by_patient(patient_id)
            .await
            .map_err(Self::map_repository_error)
    }

    /// Delete a referral; a missing row is a no-op.
    pub async fn delete_referral(&self, referral_id: ReferralId) -> Result<bool, DomainError> {
        let exists = self
            .referrals
            .exists(referral_id)
            .await
            .map_err(Self::map_repository_error)?;
        if !exists {
            return Ok(false);
        }
        self.referrals
            .delete(referral_id)
            .await
            .map_err(Self::map_repository_error)
    }

    /// A referral counts as consumed once any appointment referencing it has
    /// a status other than missed.
    ///
    /// This is an O(appointments-per-referral) scan by design; the observable
    /// contract is what matters here.
    async fn is_consumed(&self, referral: &Referral) -> Result<bool, DomainError> {
        let appointments = self
            .appointments
            .find_by_referral(referral.id)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(appointments
            .iter()
            .any(|appointment| appointment.status() != AppointmentStatus::Missed))
    }
}

#[async_trait]
impl FamilyReferralIssuer for ReferralPolicyService {
    async fn issue_family_referral(
        &self,
        patient_id: PatientId,
        valid_from: NaiveDate,
    ) -> Result<Referral, DomainError> {
        self.create_referral_for_family_doctor(patient_id, valid_from)
            .await
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
