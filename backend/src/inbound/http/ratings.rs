//! Rating HTTP handlers.

use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ids::{DoctorId, HospitalId};

use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{FieldName, parse_uuid};

/// Aggregated rating payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingBody {
    /// Mean of the non-null feedback scores, two decimals; 0.0 without
    /// feedback.
    #[schema(example = 4.33)]
    pub rating: f64,
}

/// Aggregated rating of a doctor.
#[utoipa::path(
    get,
    path = "/api/v1/doctors/{doctor_id}/rating",
    tags = ["ratings"],
    responses(
        (status = 200, description = "Doctor rating", body = RatingBody)
    )
)]
#[get("/doctors/{doctor_id}/rating")]
pub async fn doctor_rating(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let doctor_id =
        DoctorId::from_uuid(parse_uuid(&path.into_inner(), FieldName::new("doctorId"))?);
    let rating = state.ratings.calculate_doctor_rating(doctor_id).await?;
    Ok(HttpResponse::Ok().json(RatingBody { rating }))
}

/// Aggregated rating of a hospital.
#[utoipa::path(
    get,
    path = "/api/v1/hospitals/{hospital_id}/rating",
    tags = ["ratings"],
    responses(
        (status = 200, description = "Hospital rating", body = RatingBody)
    )
)]
#[get("/hospitals/{hospital_id}/rating")]
pub async fn hospital_rating(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let hospital_id = HospitalId::from_uuid(parse_uuid(
        &path.into_inner(),
        FieldName::new("hospitalId"),
    )?);
    let rating = state.ratings.calculate_hospital_rating(hospital_id).await?;
    Ok(HttpResponse::Ok().json(RatingBody { rating }))
}
