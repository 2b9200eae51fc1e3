//! Caller identity extraction.
//!
//! The identity collaborator upstream (gateway / auth proxy) resolves the
//! caller and forwards `x-caller-id` and `x-caller-role` headers; the core
//! trusts them as given. Requests without both headers are unauthorised.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload};

use crate::domain::DomainError;
use crate::domain::history::CallerContext;

use super::error::ApiError;
use super::validation::{FieldName, parse_role, parse_uuid};

/// Header carrying the caller identifier.
pub const CALLER_ID_HEADER: &str = "x-caller-id";
/// Header carrying the caller role.
pub const CALLER_ROLE_HEADER: &str = "x-caller-role";

fn header_value<'request>(
    request: &'request HttpRequest,
    name: &'static str,
) -> Result<&'request str, DomainError> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| DomainError::unauthorized(format!("missing {name} header")))
}

fn extract_caller(request: &HttpRequest) -> Result<CallerContext, DomainError> {
    let id = parse_uuid(
        header_value(request, CALLER_ID_HEADER)?,
        FieldName::new(CALLER_ID_HEADER),
    )?;
    let role = parse_role(
        header_value(request, CALLER_ROLE_HEADER)?,
        FieldName::new(CALLER_ROLE_HEADER),
    )?;
    Ok(CallerContext { id, role })
}

/// Extractor wrapper so handlers can take the caller as a parameter.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub CallerContext);

impl FromRequest for Caller {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(request: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            extract_caller(request)
                .map(Caller)
                .map_err(ApiError::from),
        )
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::actors::Role;

    #[test]
    fn extracts_id_and_role_from_headers() {
        let id = uuid::Uuid::new_v4();
        let request = TestRequest::default()
            .insert_header((CALLER_ID_HEADER, id.to_string()))
            .insert_header((CALLER_ROLE_HEADER, "doctor"))
            .to_http_request();

        let caller = extract_caller(&request).expect("caller extracted");
        assert_eq!(caller.id, id);
        assert_eq!(caller.role, Role::Doctor);
    }

    #[test]
    fn missing_headers_are_unauthorized() {
        let request = TestRequest::default().to_http_request();
        let err = extract_caller(&request).expect_err("missing headers rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn malformed_role_is_invalid() {
        let request = TestRequest::default()
            .insert_header((CALLER_ID_HEADER, uuid::Uuid::new_v4().to_string()))
            .insert_header((CALLER_ROLE_HEADER, "janitor"))
            .to_http_request();
        let err = extract_caller(&request).expect_err("bad role rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
