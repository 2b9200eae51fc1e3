//! Declaration HTTP handlers.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::declarations::Declaration;
use crate::domain::ids::{DoctorId, PatientId};

use super::error::{ApiError, ApiResult};
use super::state::HttpState;
use super::validation::{FieldName, parse_date, parse_uuid};

/// Request payload for signing a declaration.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignDeclarationBody {
    /// The declaring patient.
    #[schema(format = "uuid")]
    pub patient_id: String,
    /// The chosen family doctor.
    #[schema(format = "uuid")]
    pub doctor_id: String,
    /// The signing date.
    #[schema(example = "2026-08-05")]
    pub signed_on: String,
}

/// Sign a family-doctor declaration; issues the family referral.
#[utoipa::path(
    post,
    path = "/api/v1/declarations",
    tags = ["declarations"],
    request_body = SignDeclarationBody,
    responses(
        (status = 201, description = "Declaration signed", body = Declaration),
        (status = 400, description = "Doctor specialty and patient age class mismatch"),
        (status = 404, description = "Patient or doctor not found")
    )
)]
#[post("/declarations")]
pub async fn sign_declaration(
    state: web::Data<HttpState>,
    body: web::Json<SignDeclarationBody>,
) -> ApiResult<HttpResponse> {
    let patient_id =
        PatientId::from_uuid(parse_uuid(&body.patient_id, FieldName::new("patientId"))?);
    let doctor_id = DoctorId::from_uuid(parse_uuid(&body.doctor_id, FieldName::new("doctorId"))?);
    let signed_on = parse_date(&body.signed_on, FieldName::new("signedOn"))?;

    let declaration = state
        .declarations
        .sign_declaration(patient_id, doctor_id, signed_on)
        .await?;
    Ok(HttpResponse::Created().json(declaration))
}

/// The patient's standing declaration.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/declaration",
    tags = ["declarations"],
    responses(
        (status = 200, description = "Standing declaration", body = Declaration),
        (status = 404, description = "Patient has no declaration")
    )
)]
#[get("/patients/{patient_id}/declaration")]
pub async fn declaration_for_patient(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let patient_id = PatientId::from_uuid(parse_uuid(
        &path.into_inner(),
        FieldName::new("patientId"),
    )?);
    let declaration = state
        .declarations
        .declaration_for_patient(patient_id)
        .await?
        .ok_or_else(|| {
            ApiError::from(crate::domain::DomainError::not_found(
                "patient has no standing declaration",
            ))
        })?;
    Ok(HttpResponse::Ok().json(declaration))
}
