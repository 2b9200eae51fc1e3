//! Medical-history access control.
//!
//! Access to a patient's trail is a capability derived from appointment
//! state, not a static permission table: a patient sees their own records, a
//! doctor sees the records of patients they currently have an open
//! appointment with, and nobody else sees anything.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use super::actors::Role;
use super::appointments::AppointmentSummary;
use super::error::DomainError;
use super::ids::{DoctorId, PatientId};
use super::ports::{
    AppointmentRepository, OpenAppointmentGate, ReferralRepository, RepositoryError,
};
use super::referrals::Referral;

/// Identity of the caller as resolved by the upstream identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    /// Caller identifier.
    pub id: Uuid,
    /// Caller role.
    pub role: Role,
}

/// Port bundle required by the history service.
pub struct MedicalHistoryPorts {
    /// Appointment reads for the history listing.
    pub appointments: Arc<dyn AppointmentRepository>,
    /// Referral reads for the referral listing.
    pub referrals: Arc<dyn ReferralRepository>,
    /// Open-appointment capability gate.
    pub gate: Arc<dyn OpenAppointmentGate>,
}

/// Medical-history read service with capability checks.
pub struct MedicalHistoryService {
    appointments: Arc<dyn AppointmentRepository>,
    referrals: Arc<dyn ReferralRepository>,
    gate: Arc<dyn OpenAppointmentGate>,
}

impl MedicalHistoryService {
    /// Build the service from its port bundle.
    pub fn new(ports: MedicalHistoryPorts) -> Self {
        Self {
            appointments: ports.appointments,
            referrals: ports.referrals,
            gate: ports.gate,
        }
    }

    fn map_repository_error(error: RepositoryError) -> DomainError {
        DomainError::internal(format!("history repository error: {error}"))
    }

    /// Grant or deny access to the given patient's records.
    async fn authorize(
        &self,
        patient_id: PatientId,
        caller: CallerContext,
    ) -> Result<(), DomainError> {
        let allowed = match caller.role {
            Role::Patient => caller.id == patient_id.as_uuid(),
            Role::Doctor => {
                self.gate
                    .have_open_appointment(DoctorId::from_uuid(caller.id), patient_id)
                    .await?
            }
            Role::LabAssistant => false,
        };
        if allowed {
            Ok(())
        } else {
            warn!(patient = %patient_id, caller = %caller.id, role = %caller.role, "history access denied");
            Err(DomainError::forbidden(
                "not allowed to view this patient's medical history",
            ))
        }
    }

    /// The patient's appointment history, gated by the capability check.
    pub async fn patient_medical_history(
        &self,
        patient_id: PatientId,
        caller: CallerContext,
    ) -> Result<Vec<AppointmentSummary>, DomainError> {
        self.authorize(patient_id, caller).await?;
        let appointments = self
            .appointments
            .find_by_patient(patient_id)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(appointments.iter().map(AppointmentSummary::from).collect())
    }

    /// The patient's referral trail, gated by the same capability check.
    pub async fn patient_referrals(
        &self,
        patient_id: PatientId,
        caller: CallerContext,
    ) -> Result<Vec<Referral>, DomainError> {
        self.authorize(patient_id, caller).await?;
        self.referrals
            .find_by_patient(patient_id)
            .await
            .map_err(Self::map_repository_error)
    }
}
