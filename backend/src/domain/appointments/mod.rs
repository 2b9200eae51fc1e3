//! Appointment aggregate: status state machine, target selection, entity.
//!
//! Status only ever moves forward: `Open → Scheduled → {Missed, Completed}`.
//! The entity owns the transition check so no service can regress a terminal
//! appointment.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::DomainError;
use super::ids::{
    AppointmentId, DoctorId, HospitalId, LabAssistantId, MedicalFileId, PatientId, ReferralId,
};

mod service;
pub use service::{
    AppointmentService, AppointmentServicePorts, AppointmentSummary, CreateAppointment, DateRange,
};

/// Appointment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Slot reserved against a referral, not yet confirmed.
    Open,
    /// Date, time, and doctor or hospital assignment finalised.
    Scheduled,
    /// Sweep-detected no-show. Terminal.
    Missed,
    /// Explicitly finished with a diagnosis. Terminal.
    Completed,
}

impl AppointmentStatus {
    /// Whether this status still counts as an open appointment for the
    /// referral-precondition and history-access gates.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open | Self::Scheduled)
    }

    /// Whether the status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Missed | Self::Completed)
    }

    /// Whether the state machine permits moving to `next`.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Scheduled | Self::Missed | Self::Completed)
                | (Self::Scheduled, Self::Missed | Self::Completed)
        )
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Open => "open",
            Self::Scheduled => "scheduled",
            Self::Missed => "missed",
            Self::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// The single target of an appointment.
///
/// Doctor and hospital targets are mutually exclusive by construction; the
/// service raises a conflict before this enum is ever built when a request
/// supplies both or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentTarget {
    /// A consultation with a specific doctor.
    Doctor(DoctorId),
    /// An examination at a hospital or laboratory.
    Hospital(HospitalId),
}

impl AppointmentTarget {
    /// The doctor id, for doctor-target appointments.
    pub fn doctor_id(&self) -> Option<DoctorId> {
        match self {
            Self::Doctor(id) => Some(*id),
            Self::Hospital(_) => None,
        }
    }

    /// The hospital id, for examination-target appointments.
    pub fn hospital_id(&self) -> Option<HospitalId> {
        match self {
            Self::Doctor(_) => None,
            Self::Hospital(id) => Some(*id),
        }
    }

    /// Initial lifecycle status for an appointment with this target.
    ///
    /// Doctor consultations are fully specified at creation; examination
    /// appointments wait for a lab assistant assignment.
    pub fn initial_status(&self) -> AppointmentStatus {
        match self {
            Self::Doctor(_) => AppointmentStatus::Scheduled,
            Self::Hospital(_) => AppointmentStatus::Open,
        }
    }
}

/// A clinical encounter booked against a referral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    /// Stable identifier.
    pub id: AppointmentId,
    /// The patient attending.
    pub patient_id: PatientId,
    /// The referral this appointment consumes.
    pub referral_id: ReferralId,
    /// Calendar date of the encounter.
    pub date: NaiveDate,
    /// Start time of the encounter.
    pub time: NaiveTime,
    /// The doctor or hospital target.
    pub target: AppointmentTarget,
    /// Assigned lab assistant, for examination appointments.
    pub lab_assistant_id: Option<LabAssistantId>,
    /// Diagnosis text recorded on completion.
    pub diagnosis: Option<String>,
    /// Medical files attached on completion.
    pub file_ids: Vec<MedicalFileId>,
    status: AppointmentStatus,
    version: u32,
}

impl Appointment {
    /// Create a fresh appointment in the initial status for its target.
    pub fn create(
        patient_id: PatientId,
        referral_id: ReferralId,
        date: NaiveDate,
        time: NaiveTime,
        target: AppointmentTarget,
    ) -> Self {
        Self {
            id: AppointmentId::random(),
            patient_id,
            referral_id,
            date,
            time,
            target,
            lab_assistant_id: None,
            diagnosis: None,
            file_ids: Vec::new(),
            status: target.initial_status(),
            version: 0,
        }
    }

    /// Current lifecycle status.
    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    /// Optimistic-lock version, bumped by the repository on each save.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    /// Whether the appointment still counts as open.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Combined date and time of the encounter.
    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Advance the lifecycle status, rejecting any backwards or
    /// out-of-terminal move.
    pub fn advance(&mut self, next: AppointmentStatus) -> Result<(), DomainError> {
        if !self.status.can_advance_to(next) {
            return Err(DomainError::conflict(format!(
                "appointment status cannot move from {} to {next}",
                self.status
            )));
        }
        self.status = next;
        Ok(())
    }

    /// Attach a lab assistant; an open examination appointment becomes
    /// scheduled.
    pub fn assign_lab_assistant(&mut self, assistant_id: LabAssistantId) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::conflict(format!(
                "cannot assign a lab assistant to a {} appointment",
                self.status
            )));
        }
        self.lab_assistant_id = Some(assistant_id);
        if self.status == AppointmentStatus::Open {
            self.advance(AppointmentStatus::Scheduled)?;
        }
        Ok(())
    }

    /// Finish the appointment with a diagnosis and any stored files.
    pub fn complete(
        &mut self,
        diagnosis: String,
        file_ids: Vec<MedicalFileId>,
    ) -> Result<(), DomainError> {
        self.advance(AppointmentStatus::Completed)?;
        self.diagnosis = Some(diagnosis);
        self.file_ids = file_ids;
        Ok(())
    }

    /// Mark the appointment as missed.
    pub fn mark_missed(&mut self) -> Result<(), DomainError> {
        self.advance(AppointmentStatus::Missed)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    fn appointment(target: AppointmentTarget) -> Appointment {
        Appointment::create(
            PatientId::random(),
            ReferralId::random(),
            NaiveDate::from_ymd_opt(2026, 8, 10).expect("valid date"),
            NaiveTime::from_hms_opt(9, 30, 0).expect("valid time"),
            target,
        )
    }

    #[rstest]
    #[case(AppointmentStatus::Open, AppointmentStatus::Scheduled, true)]
    #[case(AppointmentStatus::Open, AppointmentStatus::Missed, true)]
    #[case(AppointmentStatus::Open, AppointmentStatus::Completed, true)]
    #[case(AppointmentStatus::Scheduled, AppointmentStatus::Missed, true)]
    #[case(AppointmentStatus::Scheduled, AppointmentStatus::Completed, true)]
    #[case(AppointmentStatus::Scheduled, AppointmentStatus::Open, false)]
    #[case(AppointmentStatus::Missed, AppointmentStatus::Open, false)]
    #[case(AppointmentStatus::Missed, AppointmentStatus::Scheduled, false)]
    #[case(AppointmentStatus::Missed, AppointmentStatus::Completed, false)]
    #[case(AppointmentStatus::Completed, AppointmentStatus::Open, false)]
    #[case(AppointmentStatus::Completed, AppointmentStatus::Scheduled, false)]
    #[case(AppointmentStatus::Completed, AppointmentStatus::Missed, false)]
    fn status_only_moves_forward(
        #[case] from: AppointmentStatus,
        #[case] to: AppointmentStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_advance_to(to), allowed);
    }

    #[rstest]
    fn doctor_appointments_start_scheduled() {
        let appointment = appointment(AppointmentTarget::Doctor(DoctorId::random()));
        assert_eq!(appointment.status(), AppointmentStatus::Scheduled);
        assert!(appointment.is_open());
    }

    #[rstest]
    fn examination_appointments_start_open() {
        let appointment = appointment(AppointmentTarget::Hospital(HospitalId::random()));
        assert_eq!(appointment.status(), AppointmentStatus::Open);
        assert!(appointment.is_open());
    }

    #[rstest]
    fn assigning_an_assistant_schedules_an_open_appointment() {
        let mut appointment = appointment(AppointmentTarget::Hospital(HospitalId::random()));
        let assistant = LabAssistantId::random();

        appointment
            .assign_lab_assistant(assistant)
            .expect("assignment allowed");

        assert_eq!(appointment.lab_assistant_id, Some(assistant));
        assert_eq!(appointment.status(), AppointmentStatus::Scheduled);
    }

    #[rstest]
    fn completion_records_diagnosis_and_files() {
        let mut appointment = appointment(AppointmentTarget::Doctor(DoctorId::random()));
        let file = MedicalFileId::random();

        appointment
            .complete("seasonal allergy".to_owned(), vec![file])
            .expect("completion allowed");

        assert_eq!(appointment.status(), AppointmentStatus::Completed);
        assert_eq!(appointment.diagnosis.as_deref(), Some("seasonal allergy"));
        assert_eq!(appointment.file_ids, vec![file]);
    }

    #[rstest]
    fn terminal_appointments_reject_further_transitions() {
        let mut appointment = appointment(AppointmentTarget::Doctor(DoctorId::random()));
        appointment.mark_missed().expect("miss allowed");

        let err = appointment
            .complete("too late".to_owned(), Vec::new())
            .expect_err("terminal rejected");
        assert_eq!(err.code(), ErrorCode::Conflict);

        let err = appointment
            .assign_lab_assistant(LabAssistantId::random())
            .expect_err("terminal rejected");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }
}
