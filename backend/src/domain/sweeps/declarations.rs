//! Declaration age-restriction sweep.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::actors::AgeClass;
use crate::domain::declarations::Declaration;
use crate::domain::error::DomainError;
use crate::domain::ports::{
    DeclarationRepository, DoctorRepository, DoctorTypeRepository, PatientRepository,
};

use super::{Sweep, SweepOutcome};

/// Removes declarations binding a now-adult patient to a pediatric-type
/// doctor.
pub struct DeclarationAgeSweep {
    declarations: Arc<dyn DeclarationRepository>,
    doctors: Arc<dyn DoctorRepository>,
    doctor_types: Arc<dyn DoctorTypeRepository>,
    patients: Arc<dyn PatientRepository>,
    clock: Arc<dyn Clock>,
}

impl DeclarationAgeSweep {
    /// Build the sweep.
    pub fn new(
        declarations: Arc<dyn DeclarationRepository>,
        doctors: Arc<dyn DoctorRepository>,
        doctor_types: Arc<dyn DoctorTypeRepository>,
        patients: Arc<dyn PatientRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            declarations,
            doctors,
            doctor_types,
            patients,
            clock,
        }
    }

    async fn is_outgrown(&self, declaration: &Declaration) -> Result<bool, DomainError> {
        let doctor = self
            .doctors
            .find_by_id(declaration.doctor_id)
            .await
            .map_err(|error| DomainError::internal(format!("doctor lookup failed: {error}")))?
            .ok_or_else(|| DomainError::not_found("declaration doctor not found"))?;
        let doctor_type = self
            .doctor_types
            .find_by_id(doctor.doctor_type_id)
            .await
            .map_err(|error| DomainError::internal(format!("specialty lookup failed: {error}")))?
            .ok_or_else(|| DomainError::not_found("declaration specialty not found"))?;
        if doctor_type.age_class != AgeClass::Pediatric {
            return Ok(false);
        }

        let patient = self
            .patients
            .find_by_id(declaration.patient_id)
            .await
            .map_err(|error| DomainError::internal(format!("patient lookup failed: {error}")))?
            .ok_or_else(|| DomainError::not_found("declaration patient not found"))?;
        Ok(patient.is_adult_on(self.clock.utc().date_naive()))
    }
}

#[async_trait]
impl Sweep for DeclarationAgeSweep {
    fn name(&self) -> &'static str {
        "declaration-age"
    }

    async fn run(&self) -> Result<SweepOutcome, DomainError> {
        let declarations = self
            .declarations
            .find_all()
            .await
            .map_err(|error| DomainError::internal(format!("declaration listing failed: {error}")))?;
        let examined = declarations.len();

        let mut acted = 0;
        for declaration in declarations {
            let outgrown = match self.is_outgrown(&declaration).await {
                Ok(outgrown) => outgrown,
                Err(error) => {
                    warn!(declaration = %declaration.id, %error, "skipping declaration during age sweep");
                    continue;
                }
            };
            if !outgrown {
                continue;
            }
            match self.declarations.delete(declaration.id).await {
                Ok(_) => {
                    info!(declaration = %declaration.id, patient = %declaration.patient_id, "declaration removed; patient outgrew pediatric doctor");
                    acted += 1;
                }
                Err(error) => {
                    warn!(declaration = %declaration.id, %error, "declaration removal failed; skipping");
                }
            }
        }

        Ok(SweepOutcome { examined, acted })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::actors::{Doctor, DoctorType, Patient};
    use crate::domain::ids::{DeclarationId, DoctorId, DoctorTypeId, HospitalId, PatientId};
    use crate::domain::ports::{
        MockDeclarationRepository, MockDoctorRepository, MockDoctorTypeRepository,
        MockPatientRepository,
    };
    use crate::test_support::FixedClock;

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::default_test_time())
    }

    fn sweep_with(
        birth_year: i32,
        age_class: AgeClass,
        expect_delete: usize,
    ) -> DeclarationAgeSweep {
        let declaration = Declaration {
            id: DeclarationId::random(),
            patient_id: PatientId::random(),
            doctor_id: DoctorId::random(),
            signed_on: NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date"),
        };

        let mut declarations = MockDeclarationRepository::new();
        {
            let listing = vec![declaration];
            declarations
                .expect_find_all()
                .returning(move || Ok(listing.clone()));
        }
        declarations
            .expect_delete()
            .times(expect_delete)
            .returning(|_| Ok(true));

        let type_id = DoctorTypeId::random();
        let mut doctors = MockDoctorRepository::new();
        doctors.expect_find_by_id().returning(move |id| {
            Ok(Some(Doctor {
                id,
                first_name: "Anna".to_owned(),
                last_name: "Stoyanova".to_owned(),
                doctor_type_id: type_id,
                hospital_id: HospitalId::random(),
            }))
        });
        let mut doctor_types = MockDoctorTypeRepository::new();
        doctor_types.expect_find_by_id().returning(move |id| {
            Ok(Some(DoctorType {
                id,
                name: "pediatrician".to_owned(),
                age_class,
            }))
        });
        let mut patients = MockPatientRepository::new();
        patients.expect_find_by_id().returning(move |id| {
            Ok(Some(Patient {
                id,
                first_name: "Iva".to_owned(),
                last_name: "Petrova".to_owned(),
                birth_date: NaiveDate::from_ymd_opt(birth_year, 2, 2).expect("valid date"),
            }))
        });

        DeclarationAgeSweep::new(
            Arc::new(declarations),
            Arc::new(doctors),
            Arc::new(doctor_types),
            Arc::new(patients),
            fixed_clock(),
        )
    }

    #[tokio::test]
    async fn removes_pediatric_declarations_for_adult_patients() {
        let sweep = sweep_with(2000, AgeClass::Pediatric, 1);
        let outcome = sweep.run().await.expect("sweep succeeds");
        assert_eq!(outcome.acted, 1);
    }

    #[tokio::test]
    async fn keeps_pediatric_declarations_for_minors() {
        let sweep = sweep_with(2015, AgeClass::Pediatric, 0);
        let outcome = sweep.run().await.expect("sweep succeeds");
        assert_eq!(outcome.acted, 0);
    }

    #[tokio::test]
    async fn ignores_non_pediatric_declarations() {
        let sweep = sweep_with(2000, AgeClass::All, 0);
        let outcome = sweep.run().await.expect("sweep succeeds");
        assert_eq!(outcome.acted, 0);
    }
}
