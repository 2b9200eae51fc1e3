//! Profile HTTP handlers.
//!
//! Generic contact/credential access across the actor roles, dispatched
//! through the role-keyed profile directory.

use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::actors::Role;
use crate::domain::auth::{AuthUser, ContactUpdate};

use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{FieldName, parse_role, parse_uuid};

/// Profile payload returned to clients; the password hash never leaves the
/// server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    /// Actor identifier.
    pub id: uuid::Uuid,
    /// Actor role.
    pub role: Role,
    /// Contact e-mail.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Passport / national id number.
    pub passport: String,
}

impl From<AuthUser> for ProfileBody {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            role: user.role,
            email: user.email,
            phone: user.phone,
            passport: user.passport,
        }
    }
}

/// Request payload for updating profile fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdateBody {
    /// New contact e-mail.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New passport number.
    pub passport: Option<String>,
    /// New password hash; hashing happens upstream.
    pub password_hash: Option<String>,
}

/// Fetch a profile by role and id.
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{role}/{id}",
    tags = ["profiles"],
    responses(
        (status = 200, description = "Profile record", body = ProfileBody),
        (status = 404, description = "Profile not found")
    )
)]
#[get("/profiles/{role}/{id}")]
pub async fn fetch_profile(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (role, id) = path.into_inner();
    let role = parse_role(&role, FieldName::new("role"))?;
    let id = parse_uuid(&id, FieldName::new("id"))?;

    let user = state.profiles.fetch(role, id).await?;
    Ok(HttpResponse::Ok().json(ProfileBody::from(user)))
}

/// Update contact/credential fields on a profile.
#[utoipa::path(
    put,
    path = "/api/v1/profiles/{role}/{id}",
    tags = ["profiles"],
    request_body = ContactUpdateBody,
    responses(
        (status = 200, description = "Updated profile", body = ProfileBody),
        (status = 404, description = "Profile not found")
    )
)]
#[put("/profiles/{role}/{id}")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    body: web::Json<ContactUpdateBody>,
) -> ApiResult<HttpResponse> {
    let (role, id) = path.into_inner();
    let role = parse_role(&role, FieldName::new("role"))?;
    let id = parse_uuid(&id, FieldName::new("id"))?;
    let body = body.into_inner();

    let update = ContactUpdate {
        email: body.email,
        phone: body.phone,
        passport: body.passport,
        password_hash: body.password_hash,
    };
    let user = state.profiles.update_contact(role, id, update).await?;
    Ok(HttpResponse::Ok().json(ProfileBody::from(user)))
}
