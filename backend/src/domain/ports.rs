//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (databases, file stores). Each trait exposes strongly typed errors so
//! adapters map their failures into predictable variants instead of returning
//! `anyhow::Result`.
//!
//! Adapters must execute each port call atomically with respect to concurrent
//! mutation of the same entity; services rely on this when a precondition
//! read and the following write belong to one operation.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use super::actors::{Doctor, DoctorType, Examination, Hospital, LabAssistant, Patient};
use super::appointments::{Appointment, AppointmentStatus};
use super::auth::AuthUser;
use super::declarations::Declaration;
use super::error::DomainError;
use super::ids::{
    AppointmentId, DeclarationId, DoctorId, DoctorTypeId, ExaminationId, HospitalId,
    LabAssistantId, MedicalFileId, PatientId, ReferralId,
};
use super::ratings::Feedback;
use super::referrals::Referral;
use super::reminders::{Reminder, ReminderKey};
use uuid::Uuid;

/// Failures surfaced by entity repository adapters.
///
/// Every entity port shares the same failure modes, so a single enum covers
/// them all; adapters with richer failure taxonomies fold into these
/// variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Connectivity or transaction failures.
    #[error("repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("repository query failed: {message}")]
    Query { message: String },
    /// Optimistic-version check failed on save; the row moved underneath the
    /// caller.
    #[error("stale version: expected {expected}, stored {actual}")]
    StaleVersion { expected: u32, actual: u32 },
}

impl RepositoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for optimistic-version conflicts.
    pub fn stale_version(expected: u32, actual: u32) -> Self {
        Self::StaleVersion { expected, actual }
    }
}

/// Failures surfaced by the medical file store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MedicalFileStoreError {
    /// Underlying storage I/O failed.
    #[error("medical file store failed: {message}")]
    Io { message: String },
}

impl MedicalFileStoreError {
    /// Helper for I/O failures.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

/// Outcome of a batch appointment save.
///
/// Rows whose version moved underneath the sweep are reported, not retried;
/// the next sweep run picks them up again if still applicable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchSaveOutcome {
    /// Number of rows persisted.
    pub saved: usize,
    /// Identifiers whose optimistic-version check failed.
    pub stale: Vec<AppointmentId>,
}

/// An uploaded medical file attached when completing an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicalFileUpload {
    /// Original file name supplied by the uploader.
    pub file_name: String,
    /// Raw file content.
    pub content: Vec<u8>,
}

/// A stored medical file reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicalFile {
    /// Stable identifier assigned by the store.
    pub id: MedicalFileId,
    /// Original file name.
    pub file_name: String,
}

/// Persistence port for appointments.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Fetch an appointment by identifier.
    async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError>;

    /// All appointments created against the given referral.
    async fn find_by_referral(
        &self,
        referral_id: ReferralId,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    /// All appointments between a doctor and a patient.
    async fn find_between(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    /// All appointments of a patient.
    async fn find_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    /// All appointments targeting a doctor.
    async fn find_by_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    /// All appointments currently in the given status.
    async fn find_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    /// Persist an appointment, enforcing its optimistic version. Returns the
    /// stored row with the bumped version.
    async fn save(&self, appointment: &Appointment) -> Result<Appointment, RepositoryError>;

    /// Persist a batch of mutated appointments in one shot.
    async fn save_all(
        &self,
        appointments: &[Appointment],
    ) -> Result<BatchSaveOutcome, RepositoryError>;

    /// Delete an appointment. Returns whether a row existed.
    async fn delete(&self, id: AppointmentId) -> Result<bool, RepositoryError>;
}

/// Persistence port for referrals.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReferralRepository: Send + Sync {
    /// Fetch a referral by identifier.
    async fn find_by_id(&self, id: ReferralId) -> Result<Option<Referral>, RepositoryError>;

    /// All referrals issued to the given patient.
    async fn find_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Referral>, RepositoryError>;

    /// Persist a referral.
    async fn save(&self, referral: &Referral) -> Result<(), RepositoryError>;

    /// Whether a referral row exists.
    async fn exists(&self, id: ReferralId) -> Result<bool, RepositoryError>;

    /// Delete a referral. Returns whether a row existed.
    async fn delete(&self, id: ReferralId) -> Result<bool, RepositoryError>;
}

/// Persistence port for generated reminders.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    /// Whether a reminder with the given dedup key already exists.
    async fn exists(&self, key: &ReminderKey) -> Result<bool, RepositoryError>;

    /// Persist a reminder.
    async fn save(&self, reminder: &Reminder) -> Result<(), RepositoryError>;

    /// All reminders generated for a patient.
    async fn find_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Reminder>, RepositoryError>;
}

/// Persistence port for family-doctor declarations.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DeclarationRepository: Send + Sync {
    /// All standing declarations.
    async fn find_all(&self) -> Result<Vec<Declaration>, RepositoryError>;

    /// The patient's standing declaration, if any.
    async fn find_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Option<Declaration>, RepositoryError>;

    /// Persist a declaration.
    async fn save(&self, declaration: &Declaration) -> Result<(), RepositoryError>;

    /// Delete a declaration. Returns whether a row existed.
    async fn delete(&self, id: DeclarationId) -> Result<bool, RepositoryError>;
}

/// Lookup port for patients.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Fetch a patient by identifier.
    async fn find_by_id(&self, id: PatientId) -> Result<Option<Patient>, RepositoryError>;
}

/// Lookup port for doctors.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// Fetch a doctor by identifier.
    async fn find_by_id(&self, id: DoctorId) -> Result<Option<Doctor>, RepositoryError>;
}

/// Lookup port for lab assistants.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LabAssistantRepository: Send + Sync {
    /// Fetch a lab assistant by identifier.
    async fn find_by_id(&self, id: LabAssistantId)
    -> Result<Option<LabAssistant>, RepositoryError>;
}

/// Lookup port for hospitals.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HospitalRepository: Send + Sync {
    /// Fetch a hospital by identifier.
    async fn find_by_id(&self, id: HospitalId) -> Result<Option<Hospital>, RepositoryError>;
}

/// Lookup port for doctor specialties.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DoctorTypeRepository: Send + Sync {
    /// Fetch a specialty by identifier.
    async fn find_by_id(&self, id: DoctorTypeId) -> Result<Option<DoctorType>, RepositoryError>;

    /// Fetch a specialty by its unique name (case-insensitive).
    async fn find_by_name(&self, name: &str) -> Result<Option<DoctorType>, RepositoryError>;
}

/// Lookup port for examinations.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExaminationRepository: Send + Sync {
    /// Fetch an examination by identifier.
    async fn find_by_id(&self, id: ExaminationId) -> Result<Option<Examination>, RepositoryError>;

    /// Fetch an examination by its unique name (case-insensitive).
    async fn find_by_name(&self, name: &str) -> Result<Option<Examination>, RepositoryError>;
}

/// Lookup port for feedback entries feeding rating aggregation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// All feedback left for a doctor.
    async fn find_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Feedback>, RepositoryError>;

    /// All feedback left for a hospital.
    async fn find_by_hospital(
        &self,
        hospital_id: HospitalId,
    ) -> Result<Vec<Feedback>, RepositoryError>;
}

/// Storage port for medical files attached on appointment completion.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MedicalFileStore: Send + Sync {
    /// Persist the uploaded files for an appointment and return their stored
    /// references.
    async fn persist(
        &self,
        appointment_id: AppointmentId,
        files: &[MedicalFileUpload],
    ) -> Result<Vec<MedicalFile>, MedicalFileStoreError>;
}

/// Capability port for generic profile access, one adapter per actor role.
///
/// Selected through [`crate::domain::auth::ProfileDirectory`], which is built
/// at startup; no runtime downcasting is involved.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthUserRepository: Send + Sync {
    /// Load the profile record behind an actor id.
    async fn load(&self, id: Uuid) -> Result<Option<AuthUser>, RepositoryError>;

    /// Store an updated profile record.
    async fn store(&self, user: &AuthUser) -> Result<(), RepositoryError>;
}

/// Driving port: the open-appointment capability gate.
///
/// True iff any appointment between the pair is OPEN or SCHEDULED. Referral
/// issuance and medical-history access both hang off this check.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OpenAppointmentGate: Send + Sync {
    /// Whether an open appointment links the doctor and the patient.
    async fn have_open_appointment(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<bool, DomainError>;
}

/// Driving port: the pediatric/adult specialty gate.
///
/// Implemented by the appointment service and consumed by the declaration
/// flow, which applies the same split before binding a patient to a family
/// doctor.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AgeRestrictionGate: Send + Sync {
    /// Fail when the doctor's specialty and the patient's age class do not
    /// match.
    async fn validate_doctor_and_patient_age(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<(), DomainError>;
}

/// Driving port: family-doctor referral issuance, consumed by the
/// declaration flow.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FamilyReferralIssuer: Send + Sync {
    /// Issue a family-doctor referral valid from the given date.
    async fn issue_family_referral(
        &self,
        patient_id: PatientId,
        valid_from: chrono::NaiveDate,
    ) -> Result<Referral, DomainError>;
}
