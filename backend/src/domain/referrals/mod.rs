//! Referral aggregate.
//!
//! A referral authorises a patient to book one appointment against a
//! specialty or an examination. The target is an enum, so a referral holding
//! both or neither target is unrepresentable.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{DoctorId, DoctorTypeId, ExaminationId, PatientId, ReferralId};

mod service;
pub use service::{ReferralPolicyPorts, ReferralPolicyService};

/// What a referral authorises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReferralTarget {
    /// A consultation with any doctor of the given specialty.
    DoctorType(DoctorTypeId),
    /// A specific examination at a hospital or laboratory.
    Examination(ExaminationId),
    /// A family-doctor visit; carries no specialty restriction.
    FamilyDoctor,
}

/// Authorisation record permitting a patient to book an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    /// Stable identifier.
    pub id: ReferralId,
    /// The patient the referral was issued to.
    pub patient_id: PatientId,
    /// The issuing doctor; family-doctor referrals created by signing a
    /// declaration carry none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuing_doctor_id: Option<DoctorId>,
    /// What the referral authorises.
    pub target: ReferralTarget,
    /// First day of the validity window.
    pub issued_on: NaiveDate,
    /// Last day of the validity window.
    pub expires_on: NaiveDate,
}

impl Referral {
    /// Validity window length.
    pub const VALIDITY: Months = Months::new(12);

    /// Issue a referral valid for [`Self::VALIDITY`] from `issued_on`.
    pub fn issue(
        patient_id: PatientId,
        issuing_doctor_id: Option<DoctorId>,
        target: ReferralTarget,
        issued_on: NaiveDate,
    ) -> Self {
        Self {
            id: ReferralId::random(),
            patient_id,
            issuing_doctor_id,
            target,
            issued_on,
            expires_on: issued_on
                .checked_add_months(Self::VALIDITY)
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Whether the validity window covers the given date.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.issued_on <= date && date <= self.expires_on
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[rstest]
    fn validity_window_spans_one_year() {
        let referral = Referral::issue(
            PatientId::random(),
            Some(DoctorId::random()),
            ReferralTarget::FamilyDoctor,
            date(2026, 8, 5),
        );
        assert_eq!(referral.expires_on, date(2027, 8, 5));
    }

    #[rstest]
    #[case(date(2026, 8, 5), true)]
    #[case(date(2027, 8, 5), true)]
    #[case(date(2027, 8, 6), false)]
    #[case(date(2026, 8, 4), false)]
    fn validity_bounds_are_inclusive(#[case] on: NaiveDate, #[case] valid: bool) {
        let referral = Referral::issue(
            PatientId::random(),
            None,
            ReferralTarget::FamilyDoctor,
            date(2026, 8, 5),
        );
        assert_eq!(referral.is_valid_on(on), valid);
    }
}
