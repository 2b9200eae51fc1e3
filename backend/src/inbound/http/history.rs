//! Medical-history HTTP handlers.
//!
//! Both endpoints run the capability check in the domain service; the caller
//! context comes from the trusted gateway headers.

use actix_web::{HttpResponse, get, web};

use crate::domain::appointments::AppointmentSummary;
use crate::domain::ids::PatientId;
use crate::domain::referrals::Referral;

use super::caller::Caller;
use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{FieldName, parse_uuid};

/// The patient's appointment history, gated by the capability check.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/medical-history",
    tags = ["history"],
    responses(
        (status = 200, description = "Appointment history", body = [AppointmentSummary]),
        (status = 401, description = "Caller headers missing"),
        (status = 403, description = "Caller may not view this patient's records")
    )
)]
#[get("/patients/{patient_id}/medical-history")]
pub async fn patient_medical_history(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    caller: Caller,
) -> ApiResult<HttpResponse> {
    let patient_id = PatientId::from_uuid(parse_uuid(
        &path.into_inner(),
        FieldName::new("patientId"),
    )?);
    let history = state
        .history
        .patient_medical_history(patient_id, caller.0)
        .await?;
    Ok(HttpResponse::Ok().json(history))
}

/// The patient's referral trail, gated by the same capability check.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/medical-history/referrals",
    tags = ["history"],
    responses(
        (status = 200, description = "Referral trail", body = [Referral]),
        (status = 401, description = "Caller headers missing"),
        (status = 403, description = "Caller may not view this patient's records")
    )
)]
#[get("/patients/{patient_id}/medical-history/referrals")]
pub async fn patient_referrals(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    caller: Caller,
) -> ApiResult<HttpResponse> {
    let patient_id = PatientId::from_uuid(parse_uuid(
        &path.into_inner(),
        FieldName::new("patientId"),
    )?);
    let referrals = state.history.patient_referrals(patient_id, caller.0).await?;
    Ok(HttpResponse::Ok().json(referrals))
}
