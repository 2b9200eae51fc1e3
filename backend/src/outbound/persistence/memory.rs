//! In-memory repository adapter.
//!
//! One mutex guards the whole store, so every port call is atomic with
//! respect to concurrent mutation; this is the transaction boundary the
//! domain services rely on. Appointment saves enforce the optimistic version
//! carried by the entity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::actors::{
    Doctor, DoctorType, Examination, Hospital, LabAssistant, Patient, Role,
};
use crate::domain::appointments::{Appointment, AppointmentStatus};
use crate::domain::auth::AuthUser;
use crate::domain::declarations::Declaration;
use crate::domain::ids::{
    AppointmentId, DeclarationId, DoctorId, DoctorTypeId, ExaminationId, HospitalId,
    LabAssistantId, MedicalFileId, PatientId, ReferralId,
};
use crate::domain::ports::{
    AppointmentRepository, AuthUserRepository, BatchSaveOutcome, DeclarationRepository,
    DoctorRepository, DoctorTypeRepository, ExaminationRepository, FeedbackRepository,
    HospitalRepository, LabAssistantRepository, MedicalFile, MedicalFileStore,
    MedicalFileStoreError, MedicalFileUpload, PatientRepository, ReferralRepository,
    ReminderRepository, RepositoryError,
};
use crate::domain::ratings::Feedback;
use crate::domain::referrals::Referral;
use crate::domain::reminders::{Reminder, ReminderKey};

struct StoredFile {
    appointment_id: AppointmentId,
    file: MedicalFile,
    content: Vec<u8>,
}

#[derive(Default)]
struct Tables {
    appointments: HashMap<AppointmentId, Appointment>,
    referrals: HashMap<ReferralId, Referral>,
    reminders: Vec<Reminder>,
    declarations: HashMap<DeclarationId, Declaration>,
    patients: HashMap<PatientId, Patient>,
    doctors: HashMap<DoctorId, Doctor>,
    lab_assistants: HashMap<LabAssistantId, LabAssistant>,
    hospitals: HashMap<HospitalId, Hospital>,
    doctor_types: HashMap<DoctorTypeId, DoctorType>,
    examinations: HashMap<ExaminationId, Examination>,
    feedback: Vec<Feedback>,
    auth_users: HashMap<(Role, Uuid), AuthUser>,
    files: HashMap<MedicalFileId, StoredFile>,
}

/// In-memory store implementing every persistence port.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::connection("in-memory store poisoned"))
    }

    /// Seed a patient record.
    pub fn insert_patient(&self, patient: Patient) -> Result<(), RepositoryError> {
        self.guard()?.patients.insert(patient.id, patient);
        Ok(())
    }

    /// Seed a doctor record.
    pub fn insert_doctor(&self, doctor: Doctor) -> Result<(), RepositoryError> {
        self.guard()?.doctors.insert(doctor.id, doctor);
        Ok(())
    }

    /// Seed a lab assistant record.
    pub fn insert_lab_assistant(&self, assistant: LabAssistant) -> Result<(), RepositoryError> {
        self.guard()?.lab_assistants.insert(assistant.id, assistant);
        Ok(())
    }

    /// Seed a hospital record.
    pub fn insert_hospital(&self, hospital: Hospital) -> Result<(), RepositoryError> {
        self.guard()?.hospitals.insert(hospital.id, hospital);
        Ok(())
    }

    /// Seed a doctor specialty record.
    pub fn insert_doctor_type(&self, doctor_type: DoctorType) -> Result<(), RepositoryError> {
        self.guard()?.doctor_types.insert(doctor_type.id, doctor_type);
        Ok(())
    }

    /// Seed an examination record.
    pub fn insert_examination(&self, examination: Examination) -> Result<(), RepositoryError> {
        self.guard()?.examinations.insert(examination.id, examination);
        Ok(())
    }

    /// Seed a feedback entry.
    pub fn insert_feedback(&self, feedback: Feedback) -> Result<(), RepositoryError> {
        self.guard()?.feedback.push(feedback);
        Ok(())
    }

    /// Seed a profile record.
    pub fn insert_auth_user(&self, user: AuthUser) -> Result<(), RepositoryError> {
        self.guard()?.auth_users.insert((user.role, user.id), user);
        Ok(())
    }

    /// Profile repository view bound to one role, for the role-keyed
    /// directory.
    pub fn profile_repository(self: &Arc<Self>, role: Role) -> Arc<dyn AuthUserRepository> {
        Arc::new(RoleProfiles {
            role,
            store: Arc::clone(self),
        })
    }

    /// Stored file references attached to an appointment.
    pub fn files_for(
        &self,
        appointment_id: AppointmentId,
    ) -> Result<Vec<MedicalFile>, RepositoryError> {
        Ok(self
            .guard()?
            .files
            .values()
            .filter(|stored| stored.appointment_id == appointment_id)
            .map(|stored| stored.file.clone())
            .collect())
    }

    /// Raw content of a stored file.
    pub fn file_content(&self, id: MedicalFileId) -> Result<Option<Vec<u8>>, RepositoryError> {
        Ok(self
            .guard()?
            .files
            .get(&id)
            .map(|stored| stored.content.clone()))
    }

    fn save_appointment_locked(
        tables: &mut Tables,
        appointment: &Appointment,
    ) -> Result<Appointment, RepositoryError> {
        if let Some(existing) = tables.appointments.get(&appointment.id) {
            if existing.version() != appointment.version() {
                return Err(RepositoryError::stale_version(
                    appointment.version(),
                    existing.version(),
                ));
            }
        }
        let mut stored = appointment.clone();
        stored.set_version(appointment.version() + 1);
        tables.appointments.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryStore {
    async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        Ok(self.guard()?.appointments.get(&id).cloned())
    }

    async fn find_by_referral(
        &self,
        referral_id: ReferralId,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(self
            .guard()?
            .appointments
            .values()
            .filter(|appointment| appointment.referral_id == referral_id)
            .cloned()
            .collect())
    }

    async fn find_between(
        &self,
        doctor_id: DoctorId,
        patient_id: PatientId,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(self
            .guard()?
            .appointments
            .values()
            .filter(|appointment| {
                appointment.patient_id == patient_id
                    && appointment.target.doctor_id() == Some(doctor_id)
            })
            .cloned()
            .collect())
    }

    async fn find_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(self
            .guard()?
            .appointments
            .values()
            .filter(|appointment| appointment.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn find_by_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(self
            .guard()?
            .appointments
            .values()
            .filter(|appointment| appointment.target.doctor_id() == Some(doctor_id))
            .cloned()
            .collect())
    }

    async fn find_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(self
            .guard()?
            .appointments
            .values()
            .filter(|appointment| appointment.status() == status)
            .cloned()
            .collect())
    }

    async fn save(&self, appointment: &Appointment) -> Result<Appointment, RepositoryError> {
        let mut tables = self.guard()?;
        Self::save_appointment_locked(&mut tables, appointment)
    }

    async fn save_all(
        &self,
        appointments: &[Appointment],
    ) -> Result<BatchSaveOutcome, RepositoryError> {
        let mut tables = self.guard()?;
        let mut outcome = BatchSaveOutcome::default();
        for appointment in appointments {
            match Self::save_appointment_locked(&mut tables, appointment) {
                Ok(_) => outcome.saved += 1,
                Err(RepositoryError::StaleVersion { .. }) => outcome.stale.push(appointment.id),
                Err(error) => return Err(error),
            }
        }
        Ok(outcome)
    }

    async fn delete(&self, id: AppointmentId) -> Result<bool, RepositoryError> {
        Ok(self.guard()?.appointments.remove(&id).is_some())
    }
}

#[async_trait]
impl ReferralRepository for InMemoryStore {
    async fn find_by_id(&self, id: ReferralId) -> Result<Option<Referral>, RepositoryError> {
        Ok(self.guard()?.referrals.get(&id).cloned())
    }

    async fn find_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Referral>, RepositoryError> {
        Ok(self
            .guard()?
            .referrals
            .values()
            .filter(|referral| referral.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn save(&self, referral: &Referral) -> Result<(), RepositoryError> {
        self.guard()?.referrals.insert(referral.id, referral.clone());
        Ok(())
    }

    async fn exists(&self, id: ReferralId) -> Result<bool, RepositoryError> {
        Ok(self.guard()?.referrals.contains_key(&id))
    }

    async fn delete(&self, id: ReferralId) -> Result<bool, RepositoryError> {
        Ok(self.guard()?.referrals.remove(&id).is_some())
    }
}

#[async_trait]
impl ReminderRepository for InMemoryStore {
    async fn exists(&self, key: &ReminderKey) -> Result<bool, RepositoryError> {
        Ok(self
            .guard()?
            .reminders
            .iter()
            .any(|reminder| reminder.key() == *key))
    }

    async fn save(&self, reminder: &Reminder) -> Result<(), RepositoryError> {
        self.guard()?.reminders.push(reminder.clone());
        Ok(())
    }

    async fn find_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Reminder>, RepositoryError> {
        Ok(self
            .guard()?
            .reminders
            .iter()
            .filter(|reminder| reminder.patient_id == patient_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DeclarationRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Declaration>, RepositoryError> {
        Ok(self.guard()?.declarations.values().cloned().collect())
    }

    async fn find_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Option<Declaration>, RepositoryError> {
        Ok(self
            .guard()?
            .declarations
            .values()
            .find(|declaration| declaration.patient_id == patient_id)
            .cloned())
    }

    async fn save(&self, declaration: &Declaration) -> Result<(), RepositoryError> {
        self.guard()?
            .declarations
            .insert(declaration.id, declaration.clone());
        Ok(())
    }

    async fn delete(&self, id: DeclarationId) -> Result<bool, RepositoryError> {
        Ok(self.guard()?.declarations.remove(&id).is_some())
    }
}

#[async_trait]
impl PatientRepository for InMemoryStore {
    async fn find_by_id(&self, id: PatientId) -> Result<Option<Patient>, RepositoryError> {
        Ok(self.guard()?.patients.get(&id).cloned())
    }
}

#[async_trait]
impl DoctorRepository for InMemoryStore {
    async fn find_by_id(&self, id: DoctorId) -> Result<Option<Doctor>, RepositoryError> {
        Ok(self.guard()?.doctors.get(&id).cloned())
    }
}

#[async_trait]
impl LabAssistantRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        id: LabAssistantId,
    ) -> Result<Option<LabAssistant>, RepositoryError> {
        Ok(self.guard()?.lab_assistants.get(&id).cloned())
    }
}

#[async_trait]
impl HospitalRepository for InMemoryStore {
    async fn find_by_id(&self, id: HospitalId) -> Result<Option<Hospital>, RepositoryError> {
        Ok(self.guard()?.hospitals.get(&id).cloned())
    }
}

#[async_trait]
impl DoctorTypeRepository for InMemoryStore {
    async fn find_by_id(&self, id: DoctorTypeId) -> Result<Option<DoctorType>, RepositoryError> {
        Ok(self.guard()?.doctor_types.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<DoctorType>, RepositoryError> {
        Ok(self
            .guard()?
            .doctor_types
            .values()
            .find(|doctor_type| doctor_type.name.eq_ignore_ascii_case(name))
            .cloned())
    }
}

#[async_trait]
impl ExaminationRepository for InMemoryStore {
    async fn find_by_id(&self, id: ExaminationId) -> Result<Option<Examination>, RepositoryError> {
        Ok(self.guard()?.examinations.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Examination>, RepositoryError> {
        Ok(self
            .guard()?
            .examinations
            .values()
            .find(|examination| examination.name.eq_ignore_ascii_case(name))
            .cloned())
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryStore {
    async fn find_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Feedback>, RepositoryError> {
        Ok(self
            .guard()?
            .feedback
            .iter()
            .filter(|feedback| feedback.doctor_id == Some(doctor_id))
            .cloned()
            .collect())
    }

    async fn find_by_hospital(
        &self,
        hospital_id: HospitalId,
    ) -> Result<Vec<Feedback>, RepositoryError> {
        Ok(self
            .guard()?
            .feedback
            .iter()
            .filter(|feedback| feedback.hospital_id == Some(hospital_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MedicalFileStore for InMemoryStore {
    async fn persist(
        &self,
        appointment_id: AppointmentId,
        files: &[MedicalFileUpload],
    ) -> Result<Vec<MedicalFile>, MedicalFileStoreError> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| MedicalFileStoreError::io("in-memory store poisoned"))?;
        let mut stored = Vec::with_capacity(files.len());
        for upload in files {
            let file = MedicalFile {
                id: MedicalFileId::random(),
                file_name: upload.file_name.clone(),
            };
            tables.files.insert(
                file.id,
                StoredFile {
                    appointment_id,
                    file: file.clone(),
                    content: upload.content.clone(),
                },
            );
            stored.push(file);
        }
        Ok(stored)
    }
}

struct RoleProfiles {
    role: Role,
    store: Arc<InMemoryStore>,
}

#[async_trait]
impl AuthUserRepository for RoleProfiles {
    async fn load(&self, id: Uuid) -> Result<Option<AuthUser>, RepositoryError> {
        Ok(self.store.guard()?.auth_users.get(&(self.role, id)).cloned())
    }

    async fn store(&self, user: &AuthUser) -> Result<(), RepositoryError> {
        self.store
            .guard()?
            .auth_users
            .insert((self.role, user.id), user.clone());
        Ok(())
    }
}
