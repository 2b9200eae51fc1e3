//! Actor entities referenced by referrals and appointments.
//!
//! The core treats patients, doctors, and lab assistants as opaque records
//! resolved by id through repositories. The only behaviour that lives here is
//! what the lifecycle rules need: patient age derivation and the
//! pediatric/adult specialty split.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::DomainError;
use super::ids::{DoctorId, DoctorTypeId, ExaminationId, HospitalId, LabAssistantId, PatientId};

/// Age at which a patient stops being a pediatric case.
pub const ADULT_AGE_YEARS: u32 = 18;

/// Specialty name reserved for family doctors. Referrals towards it go
/// through the declaration path, never through the generic doctor referral.
pub const FAMILY_DOCTOR_TYPE_NAME: &str = "family doctor";

/// Caller roles recognised by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A patient acting on their own records.
    Patient,
    /// A doctor acting on patients they treat.
    Doctor,
    /// A lab assistant handling examination appointments.
    LabAssistant,
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "patient" => Ok(Self::Patient),
            "doctor" => Ok(Self::Doctor),
            "lab_assistant" | "lab-assistant" => Ok(Self::LabAssistant),
            _ => Err(UnknownRole),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::LabAssistant => "lab_assistant",
        };
        f.write_str(label)
    }
}

/// Raised when parsing an unrecognised role label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownRole;

impl std::fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("unknown caller role")
    }
}

impl std::error::Error for UnknownRole {}

/// Which patient age class a specialty serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AgeClass {
    /// Minors only (e.g. pediatrician).
    Pediatric,
    /// Adults only.
    Adult,
    /// No age restriction.
    All,
}

/// Doctor specialty record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DoctorType {
    /// Stable identifier.
    pub id: DoctorTypeId,
    /// Specialty name, unique within the registry.
    pub name: String,
    /// Patient age class this specialty serves.
    pub age_class: AgeClass,
}

impl DoctorType {
    /// Whether this is the reserved family-doctor specialty.
    pub fn is_family_doctor(&self) -> bool {
        self.name.eq_ignore_ascii_case(FAMILY_DOCTOR_TYPE_NAME)
    }
}

/// Examination kind performed at a hospital or laboratory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Examination {
    /// Stable identifier.
    pub id: ExaminationId,
    /// Examination name, unique within the registry.
    pub name: String,
}

/// Hospital or laboratory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Hospital {
    /// Stable identifier.
    pub id: HospitalId,
    /// Display name.
    pub name: String,
}

/// Patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    /// Stable identifier.
    pub id: PatientId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Birth date; drives age-based specialty restrictions.
    pub birth_date: NaiveDate,
}

impl Patient {
    /// Full years of age on the given date.
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        date.years_since(self.birth_date).unwrap_or(0)
    }

    /// Whether the patient counts as an adult on the given date.
    pub fn is_adult_on(&self, date: NaiveDate) -> bool {
        self.age_on(date) >= ADULT_AGE_YEARS
    }
}

/// Doctor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Doctor {
    /// Stable identifier.
    pub id: DoctorId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Specialty reference.
    pub doctor_type_id: DoctorTypeId,
    /// Employing hospital.
    pub hospital_id: HospitalId,
}

/// Lab assistant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LabAssistant {
    /// Stable identifier.
    pub id: LabAssistantId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Employing hospital.
    pub hospital_id: HospitalId,
}

/// Check the pediatric/adult specialty split for a doctor-patient pair.
///
/// Fails with [`crate::domain::ErrorCode::AgeRestriction`] when an adult-only
/// specialty is matched with a minor or a pediatric specialty with an adult.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use polyclinic_backend::domain::actors::{
///     check_specialty_age, AgeClass, DoctorType, Patient,
/// };
/// use polyclinic_backend::domain::ids::{DoctorTypeId, PatientId};
///
/// let pediatrician = DoctorType {
///     id: DoctorTypeId::random(),
///     name: "pediatrician".to_owned(),
///     age_class: AgeClass::Pediatric,
/// };
/// let child = Patient {
///     id: PatientId::random(),
///     first_name: "Iva".to_owned(),
///     last_name: "Petrova".to_owned(),
///     birth_date: NaiveDate::from_ymd_opt(2020, 5, 1).expect("valid date"),
/// };
/// let today = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");
/// assert!(check_specialty_age(&pediatrician, &child, today).is_ok());
/// ```
pub fn check_specialty_age(
    doctor_type: &DoctorType,
    patient: &Patient,
    on: NaiveDate,
) -> Result<(), DomainError> {
    let adult = patient.is_adult_on(on);
    match doctor_type.age_class {
        AgeClass::Pediatric if adult => Err(DomainError::age_restriction(format!(
            "specialty {} treats minors only",
            doctor_type.name
        ))),
        AgeClass::Adult if !adult => Err(DomainError::age_restriction(format!(
            "specialty {} treats adults only",
            doctor_type.name
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    fn doctor_type(age_class: AgeClass) -> DoctorType {
        DoctorType {
            id: DoctorTypeId::random(),
            name: "cardiologist".to_owned(),
            age_class,
        }
    }

    fn patient_born(year: i32) -> Patient {
        Patient {
            id: PatientId::random(),
            first_name: "Maria".to_owned(),
            last_name: "Ivanova".to_owned(),
            birth_date: NaiveDate::from_ymd_opt(year, 6, 15).expect("valid date"),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).expect("valid date")
    }

    #[rstest]
    #[case(AgeClass::Adult, 1990, true)]
    #[case(AgeClass::Adult, 2015, false)]
    #[case(AgeClass::Pediatric, 2015, true)]
    #[case(AgeClass::Pediatric, 1990, false)]
    #[case(AgeClass::All, 2015, true)]
    #[case(AgeClass::All, 1990, true)]
    fn specialty_age_split(
        #[case] age_class: AgeClass,
        #[case] birth_year: i32,
        #[case] allowed: bool,
    ) {
        let result = check_specialty_age(&doctor_type(age_class), &patient_born(birth_year), today());
        if allowed {
            result.expect("pair allowed");
        } else {
            let err = result.expect_err("pair rejected");
            assert_eq!(err.code(), ErrorCode::AgeRestriction);
        }
    }

    #[rstest]
    fn age_is_in_full_years() {
        let patient = patient_born(2008);
        // Birthday is 15 June; one day before the 18th birthday still counts
        // as a minor.
        let before = NaiveDate::from_ymd_opt(2026, 6, 14).expect("valid date");
        let after = NaiveDate::from_ymd_opt(2026, 6, 15).expect("valid date");
        assert!(!patient.is_adult_on(before));
        assert!(patient.is_adult_on(after));
    }

    #[rstest]
    #[case("Family Doctor", true)]
    #[case("family doctor", true)]
    #[case("cardiologist", false)]
    fn family_doctor_name_matching(#[case] name: &str, #[case] expected: bool) {
        let doctor_type = DoctorType {
            id: DoctorTypeId::random(),
            name: name.to_owned(),
            age_class: AgeClass::All,
        };
        assert_eq!(doctor_type.is_family_doctor(), expected);
    }

    #[rstest]
    fn role_parses_from_header_labels() {
        assert_eq!("patient".parse::<Role>(), Ok(Role::Patient));
        assert_eq!("DOCTOR".parse::<Role>(), Ok(Role::Doctor));
        assert_eq!("lab-assistant".parse::<Role>(), Ok(Role::LabAssistant));
        assert_eq!("admin".parse::<Role>(), Err(UnknownRole));
    }
}
