//! Family-doctor declarations.
//!
//! A declaration binds a patient to a family doctor. Signing one runs the
//! same pediatric/adult specialty gate the appointment lifecycle exposes and
//! issues the patient's family-doctor referral; the declaration-age sweep
//! later removes declarations whose pediatric doctor no longer matches a
//! grown-up patient.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::error::DomainError;
use super::ids::{DeclarationId, DoctorId, PatientId};
use super::ports::{
    AgeRestrictionGate, DeclarationRepository, FamilyReferralIssuer, RepositoryError,
};

/// Standing patient–family-doctor relationship record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    /// Stable identifier.
    pub id: DeclarationId,
    /// The declaring patient.
    pub patient_id: PatientId,
    /// The chosen family doctor.
    pub doctor_id: DoctorId,
    /// The day the declaration was signed.
    pub signed_on: NaiveDate,
}

/// Port bundle required by the declaration service.
pub struct DeclarationServicePorts {
    /// Declaration persistence adapter.
    pub declarations: Arc<dyn DeclarationRepository>,
    /// Specialty/age gate shared with the appointment lifecycle.
    pub age_gate: Arc<dyn AgeRestrictionGate>,
    /// Family-doctor referral issuance.
    pub referrals: Arc<dyn FamilyReferralIssuer>,
}

/// Declaration signing service.
pub struct DeclarationService {
    declarations: Arc<dyn DeclarationRepository>,
    age_gate: Arc<dyn AgeRestrictionGate>,
    referrals: Arc<dyn FamilyReferralIssuer>,
}

impl DeclarationService {
    /// Build the service from its port bundle.
    pub fn new(ports: DeclarationServicePorts) -> Self {
        Self {
            declarations: ports.declarations,
            age_gate: ports.age_gate,
            referrals: ports.referrals,
        }
    }

    fn map_repository_error(error: RepositoryError) -> DomainError {
        DomainError::internal(format!("declaration repository error: {error}"))
    }

    /// Sign a declaration, replacing any earlier one, and issue the
    /// family-doctor referral valid from the signing date.
    pub async fn sign_declaration(
        &self,
        patient_id: PatientId,
        doctor_id: DoctorId,
        signed_on: NaiveDate,
    ) -> Result<Declaration, DomainError> {
        self.age_gate
            .validate_doctor_and_patient_age(doctor_id, patient_id)
            .await?;

        if let Some(previous) = self
            .declarations
            .find_by_patient(patient_id)
            .await
            .map_err(Self::map_repository_error)?
        {
            self.declarations
                .delete(previous.id)
                .await
                .map_err(Self::map_repository_error)?;
        }

        let declaration = Declaration {
            id: DeclarationId::random(),
            patient_id,
            doctor_id,
            signed_on,
        };
        self.declarations
            .save(&declaration)
            .await
            .map_err(Self::map_repository_error)?;

        self.referrals
            .issue_family_referral(patient_id, signed_on)
            .await?;

        info!(patient = %patient_id, doctor = %doctor_id, "declaration signed");
        Ok(declaration)
    }

    /// The patient's standing declaration, if any.
    pub async fn declaration_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Option<Declaration>, DomainError> {
        self.declarations
            .find_by_patient(patient_id)
            .await
            .map_err(Self::map_repository_error)
    }
}
