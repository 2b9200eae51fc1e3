//! Appointment lifecycle services.
//!
//! All appointment mutation funnels through [`AppointmentService`]; no other
//! component writes appointment status directly. Adapters behind the ports
//! execute each call atomically, which keeps the precondition reads and the
//! single trailing write of every operation consistent under concurrency.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::actors::check_specialty_age;
use crate::domain::error::DomainError;
use crate::domain::ids::{
    AppointmentId, DoctorId, HospitalId, LabAssistantId, MedicalFileId, PatientId, ReferralId,
};
use crate::domain::ports::{
    AgeRestrictionGate, AppointmentRepository, DoctorRepository, DoctorTypeRepository,
    HospitalRepository, LabAssistantRepository, MedicalFileStore, MedicalFileUpload,
    OpenAppointmentGate, PatientRepository, ReferralRepository, RepositoryError,
};

use super::{Appointment, AppointmentStatus, AppointmentTarget};

/// Request to create an appointment against a referral.
///
/// Exactly one of `doctor_id` and `hospital_id` must be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAppointment {
    /// The attending patient.
    pub patient_id: PatientId,
    /// Doctor target, for consultations.
    pub doctor_id: Option<DoctorId>,
    /// Hospital target, for examinations.
    pub hospital_id: Option<HospitalId>,
    /// The referral being consumed.
    pub referral_id: ReferralId,
    /// Calendar date.
    pub date: NaiveDate,
    /// Start time.
    pub time: chrono::NaiveTime,
}

/// Inclusive date range filter for appointment listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    /// Lower bound, inclusive.
    pub from: Option<NaiveDate>,
    /// Upper bound, inclusive.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Whether the given date falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Short appointment view returned by listing operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    /// Appointment identifier.
    pub id: AppointmentId,
    /// The attending patient.
    pub patient_id: PatientId,
    /// Doctor target, when the appointment is a consultation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<DoctorId>,
    /// Hospital target, when the appointment is an examination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<HospitalId>,
    /// Assigned lab assistant, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab_assistant_id: Option<LabAssistantId>,
    /// Calendar date.
    pub date: NaiveDate,
    /// Start time.
    pub time: chrono::NaiveTime,
    /// Lifecycle status.
    pub status: AppointmentStatus,
}

impl From<&Appointment> for AppointmentSummary {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.target.doctor_id(),
            hospital_id: appointment.target.hospital_id(),
            lab_assistant_id: appointment.lab_assistant_id,
            date: appointment.date,
            time: appointment.time,
            status: appointment.status(),
        }
    }
}

/// Port bundle required by the appointment service.
pub struct AppointmentServicePorts {
    /// Appointment persistence adapter.
    pub appointments: Arc<dyn AppointmentRepository>,
    /// Referral persistence adapter.
    pub referrals: Arc<dyn ReferralRepository>,
    /// Patient lookup adapter.
    pub patients: Arc<dyn PatientRepository>,
    /// Doctor lookup adapter.
    pub doctors: Arc<dyn DoctorRepository>,
    /// Hospital lookup adapter.
    pub hospitals: Arc<dyn HospitalRepository>,
    /// Lab assistant lookup adapter.
    pub lab_assistants: Arc<dyn LabAssistantRepository>,
    /// Specialty lookup adapter.
    pub doctor_types: Arc<dyn DoctorTypeRepository>,
    /// Medical file storage adapter.
    pub files: Arc<dyn MedicalFileStore>,
}

/// Appointment lifecycle service.
pub struct AppointmentService {
    appointments: Arc<dyn AppointmentRepository>,
    referrals: Arc<dyn ReferralRepository>,
    patients: Arc<dyn PatientRepository>,
    doctors: Arc<dyn DoctorRepository>,
    hospitals: Arc<dyn HospitalRepository>,
    lab_assistants: Arc<dyn LabAssistantRepository>,
    doctor_types: Arc<dyn DoctorTypeRepository>,
    files: Arc<dyn MedicalFileStore>,
    clock: Arc<dyn Clock>,
}

impl AppointmentService {
    /// Build the service from its port bundle and a clock.
    pub fn new(ports: AppointmentServicePorts, clock: Arc<dyn Clock>) -> Self {
        Self {
            appointments: ports.appointments,
            referrals: ports.referrals,
            patients: ports.patients,
            doctors: ports.doctors,
            hospitals: ports.hospitals,
            lab_assistants: ports.lab_assistants,
            doctor_types: ports.doctor_types,
            files: ports.files,
            clock,
        }
    }

    fn map_repository_error(error: RepositoryError) -> DomainError {
        match error {
            RepositoryError::Connection { message } | RepositoryError::Query { message } => {
                DomainError::internal(format!("appointment repository error: {message}"))
            }
            RepositoryError::StaleVersion { expected, actual } => {
                DomainError::conflict(format!(
                    "appointment changed concurrently (version {expected} vs {actual})"
                ))
            }
        }
    }

    fn resolve_target(request: &CreateAppointment) -> Result<AppointmentTarget, DomainError> {
        match (request.doctor_id, request.hospital_id) {
            (Some(doctor_id), None) => Ok(AppointmentTarget::Doctor(doctor_id)),
            (None, Some(hospital_id)) => Ok(AppointmentTarget::Hospital(hospital_id)),
            (Some(_), Some(_)) => Err(DomainError::conflict(
                "appointment cannot target both a doctor and a hospital",
            )),
            (None, None) => Err(DomainError::conflict(
                "appointment must target a doctor or a hospital",
            )),
        }
    }

    /// Create an appointment against a valid referral.
    ///
    /// The target check runs before any persistence so a conflicting request
    /// leaves no trace.
    pub async fn create_appointment(
        &self,
        request: CreateAppointment,
    ) -> Result<Appointment, DomainError> {
        let target = Self::resolve_target(&request)?;

        let referral = self
            .referrals
            .find_by_id(request.referral_id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("referral not found"))?;
        if referral.patient_id != request.patient_id {
            return Err(DomainError::precondition_failed(
                "referral was not issued to this patient",
            ));
        }

        self.patients
            .find_by_id(request.patient_id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("patient not found"))?;

        match target {
            AppointmentTarget::Doctor(doctor_id) => {
                self.doctors
                    .find_by_id(doctor_id)
                    .await
                    .map_err(Self::map_repository_error)?
                    .ok_or_else(|| DomainError::not_found("doctor not found"))?;
            }
            AppointmentTarget::Hospital(hospital_id) => {
                self.hospitals
                    .find_by_id(hospital_id)
                    .await
                    .map_err(Self::map_repository_error)?
                    .ok_or_else(|| DomainError::not_found("hospital not found"))?;
            }
        }

        let appointment = Appointment::create(
            request.patient_id,
            request.referral_id,
            request.date,
            request.time,
            target,
        );
        let stored = self
            .appointments
            .save(&appointment)
            .await
            .map_err(Self::map_repository_error)?;
        info!(appointment = %stored.id, patient = %stored.patient_id, "appointment created");
        Ok(stored)
    }

    /// Finish an appointment with a diagnosis, persisting any uploaded
    /// medical files first.
    pub async fn finish_appointment(
        &self,
        user_id: Uuid,
        files: Vec<MedicalFileUpload>,
        appointment_id: AppointmentId,
        diagnosis: String,
    ) -> Result<Appointment, DomainError> {
        let mut appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("appointment not found"))?;

        let file_ids: Vec<MedicalFileId> = if files.is_empty() {
            Vec::new()
        } else {
            self.files
                .persist(appointment_id, &files)
                .await
                .map_err(|err| DomainError::io_failure(format!("medical file storage failed: {err}")))?
                .into_iter()
                .map(|file| file.id)
                .collect()
        };

        appointment.complete(diagnosis, file_ids)?;
        let stored = self
            .appointments
            .save(&appointment)
            .await
            .map_err(Self::map_repository_error)?;
        info!(appointment = %appointment_id, completed_by = %user_id, "appointment completed");
        Ok(stored)
    }

    /// Cancel an appointment.
    ///
    /// The caller must be the targeted doctor, the patient, or a lab
    /// assistant; anyone else is rejected.
    pub async fn cancel_appointment(
        &self,
        caller_id: Uuid,
        doctor_id: DoctorId,
        patient_id: PatientId,
        appointment_id: AppointmentId,
    ) -> Result<(), DomainError> {
        let authorized = caller_id == doctor_id.as_uuid()
            || caller_id == patient_id.as_uuid()
            || self
                .lab_assistants
                .find_by_id(LabAssistantId::from_uuid(caller_id))
                .await
                .map_err(Self::map_repository_error)?
                .is_some();
        if !authorized {
            return Err(DomainError::forbidden(
                "only the doctor, the patient, or a lab assistant may cancel an appointment",
            ));
        }

        let existed = self
            .appointments
            .delete(appointment_id)
            .await
            .map_err(Self::map_repository_error)?;
        if !existed {
            return Err(DomainError::not_found("appointment not found"));
        }
        info!(appointment = %appointment_id, caller = %caller_id, "appointment cancelled");
        Ok(())
    }

    /// Attach a lab assistant to an appointment.
    pub async fn assign_lab_assistant(
        &self,
        lab_assistant_id: LabAssistantId,
        appointment_id: AppointmentId,
    ) -> Result<Appointment, DomainError> {
        self.lab_assistants
            .find_by_id(lab_assistant_id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("lab assistant not found"))?;

        let mut appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("appointment not found"))?;

        appointment.assign_lab_assistant(lab_assistant_id)?;
        self.appointments
            .save(&appointment)
            .await
            .map_err(Self::map_repository_error)
    }

    /// Fail with an age-restriction error when the doctor's specialty and the
    /// patient's age class do not match.
    pub async fn validate_doctor_and_patient_age(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<(), DomainError> {
        let doctor = self
            .doctors
            .find_by_id(doctor_id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("doctor not found"))?;
        let doctor_type = self
            .doctor_types
            .find_by_id(doctor.doctor_type_id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("doctor specialty not found"))?;
        let patient = self
            .patients
            .find_by_id(patient_id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("patient not found"))?;

        check_specialty_age(&doctor_type, &patient, self.clock.utc().date_naive())
    }

    /// Range-filtered appointment listing for a patient.
    ///
    /// Internal failures are deliberately reported as an authorisation
    /// denial so nothing about the store leaks to the caller.
    pub async fn appointments_for_patient(
        &self,
        patient_id: PatientId,
        range: DateRange,
    ) -> Result<Vec<AppointmentSummary>, DomainError> {
        let appointments = match self.appointments.find_by_patient(patient_id).await {
            Ok(appointments) => appointments,
            Err(error) => {
                warn!(patient = %patient_id, %error, "patient listing failed; reporting as denial");
                return Err(DomainError::unauthorized(
                    "not allowed to list appointments for this patient",
                ));
            }
        };
        Ok(Self::summarize(appointments, range))
    }

    /// Range-filtered appointment listing for a doctor.
    ///
    /// Internal failures are deliberately reported as not-found so nothing
    /// about the store leaks to the caller.
    pub async fn appointments_for_doctor(
        &self,
        doctor_id: DoctorId,
        range: DateRange,
    ) -> Result<Vec<AppointmentSummary>, DomainError> {
        let appointments = match self.appointments.find_by_doctor(doctor_id).await {
            Ok(appointments) => appointments,
            Err(error) => {
                warn!(doctor = %doctor_id, %error, "doctor listing failed; reporting as not found");
                return Err(DomainError::not_found("no appointments found for doctor"));
            }
        };
        Ok(Self::summarize(appointments, range))
    }

    fn summarize(appointments: Vec<Appointment>, range: DateRange) -> Vec<AppointmentSummary> {
        let mut summaries: Vec<AppointmentSummary> = appointments
            .iter()
            .filter(|appointment| range.contains(appointment.date))
            .map(AppointmentSummary::from)
            .collect();
        summaries.sort_by_key(|summary| (summary.date, summary.time));
        summaries
    }
}

#[async_trait]
impl AgeRestrictionGate for AppointmentService {
    async fn validate_doctor_and_patient_age(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<(), DomainError> {
        Self::validate_doctor_and_patient_age(self, doctor_id, patient_id).await
    }
}

#[async_trait]
impl OpenAppointmentGate for AppointmentService {
    async fn have_open_appointment(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<bool, DomainError> {
        let appointments = self
            .appointments
            .find_between(doctor_id, patient_id)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(appointments.iter().any(Appointment::is_open))
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
