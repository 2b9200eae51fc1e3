//! Referral HTTP handlers.
//!
//! Doctor and examination referrals take the issuing doctor from the caller
//! context; the dedicated family-doctor path needs no issuing doctor.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;
use crate::domain::actors::Role;
use crate::domain::ids::{DoctorId, PatientId, ReferralId};
use crate::domain::referrals::Referral;

use super::caller::Caller;
use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{FieldName, parse_date, parse_uuid};

/// Request payload for a doctor-specialty referral.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorReferralBody {
    /// The patient receiving the referral.
    #[schema(format = "uuid")]
    pub patient_id: String,
    /// Target specialty name.
    #[schema(example = "cardiologist")]
    pub doctor_type: String,
}

/// Request payload for an examination referral.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExaminationReferralBody {
    /// The patient receiving the referral.
    #[schema(format = "uuid")]
    pub patient_id: String,
    /// Target examination name.
    #[schema(example = "blood panel")]
    pub examination: String,
}

/// Request payload for a family-doctor referral.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FamilyDoctorReferralBody {
    /// The patient receiving the referral.
    #[schema(format = "uuid")]
    pub patient_id: String,
    /// First day of the validity window.
    #[schema(example = "2026-08-05")]
    pub valid_from: String,
}

fn require_doctor(caller: &Caller) -> Result<DoctorId, DomainError> {
    if caller.0.role != Role::Doctor {
        return Err(DomainError::forbidden("only doctors may issue referrals"));
    }
    Ok(DoctorId::from_uuid(caller.0.id))
}

/// Issue a referral towards a doctor specialty.
#[utoipa::path(
    post,
    path = "/api/v1/referrals/doctor",
    tags = ["referrals"],
    request_body = DoctorReferralBody,
    responses(
        (status = 201, description = "Referral issued", body = Referral),
        (status = 400, description = "No open appointment, or family specialty targeted"),
        (status = 403, description = "Caller is not a doctor"),
        (status = 404, description = "Specialty not found")
    )
)]
#[post("/referrals/doctor")]
pub async fn create_referral_for_doctor(
    state: web::Data<HttpState>,
    caller: Caller,
    body: web::Json<DoctorReferralBody>,
) -> ApiResult<HttpResponse> {
    let doctor_id = require_doctor(&caller)?;
    let patient_id =
        PatientId::from_uuid(parse_uuid(&body.patient_id, FieldName::new("patientId"))?);

    let referral = state
        .referrals
        .create_referral_for_doctor(doctor_id, patient_id, &body.doctor_type)
        .await?;
    Ok(HttpResponse::Created().json(referral))
}

/// Issue a referral towards an examination.
#[utoipa::path(
    post,
    path = "/api/v1/referrals/examination",
    tags = ["referrals"],
    request_body = ExaminationReferralBody,
    responses(
        (status = 201, description = "Referral issued", body = Referral),
        (status = 400, description = "No open appointment between doctor and patient"),
        (status = 403, description = "Caller is not a doctor"),
        (status = 404, description = "Examination not found")
    )
)]
#[post("/referrals/examination")]
pub async fn create_referral_for_examination(
    state: web::Data<HttpState>,
    caller: Caller,
    body: web::Json<ExaminationReferralBody>,
) -> ApiResult<HttpResponse> {
    let doctor_id = require_doctor(&caller)?;
    let patient_id =
        PatientId::from_uuid(parse_uuid(&body.patient_id, FieldName::new("patientId"))?);

    let referral = state
        .referrals
        .create_referral_for_examination(doctor_id, patient_id, &body.examination)
        .await?;
    Ok(HttpResponse::Created().json(referral))
}

/// Issue a family-doctor referral.
#[utoipa::path(
    post,
    path = "/api/v1/referrals/family-doctor",
    tags = ["referrals"],
    request_body = FamilyDoctorReferralBody,
    responses(
        (status = 201, description = "Referral issued", body = Referral),
        (status = 404, description = "Family-doctor specialty not registered")
    )
)]
#[post("/referrals/family-doctor")]
pub async fn create_referral_for_family_doctor(
    state: web::Data<HttpState>,
    body: web::Json<FamilyDoctorReferralBody>,
) -> ApiResult<HttpResponse> {
    let patient_id =
        PatientId::from_uuid(parse_uuid(&body.patient_id, FieldName::new("patientId"))?);
    let valid_from = parse_date(&body.valid_from, FieldName::new("validFrom"))?;

    let referral = state
        .referrals
        .create_referral_for_family_doctor(patient_id, valid_from)
        .await?;
    Ok(HttpResponse::Created().json(referral))
}

/// Referrals the patient can still book against.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/referrals/active",
    tags = ["referrals"],
    responses(
        (status = 200, description = "Active referrals", body = [Referral])
    )
)]
#[get("/patients/{patient_id}/referrals/active")]
pub async fn active_referrals(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let patient_id = PatientId::from_uuid(parse_uuid(
        &path.into_inner(),
        FieldName::new("patientId"),
    )?);
    let referrals = state.referrals.get_active_referrals(patient_id).await?;
    Ok(HttpResponse::Ok().json(referrals))
}

/// Unfiltered referral listing for administrative views.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/referrals",
    tags = ["referrals"],
    responses(
        (status = 200, description = "All referrals", body = [Referral])
    )
)]
#[get("/patients/{patient_id}/referrals")]
pub async fn all_referrals(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let patient_id = PatientId::from_uuid(parse_uuid(
        &path.into_inner(),
        FieldName::new("patientId"),
    )?);
    let referrals = state.referrals.get_all_referrals(patient_id).await?;
    Ok(HttpResponse::Ok().json(referrals))
}

/// Delete a referral; deleting a missing referral is a no-op.
#[utoipa::path(
    delete,
    path = "/api/v1/referrals/{referral_id}",
    tags = ["referrals"],
    responses(
        (status = 204, description = "Referral removed or already absent")
    )
)]
#[delete("/referrals/{referral_id}")]
pub async fn delete_referral(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let referral_id = ReferralId::from_uuid(parse_uuid(
        &path.into_inner(),
        FieldName::new("referralId"),
    )?);
    state.referrals.delete_referral(referral_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
