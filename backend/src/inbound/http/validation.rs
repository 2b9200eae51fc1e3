//! Shared validation helpers for the inbound HTTP adapter.

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::domain::actors::Role;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidDate,
    InvalidTime,
    InvalidRole,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidTime => "invalid_time",
            ErrorCode::InvalidRole => "invalid_role",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn invalid_value_error(
    field: FieldName,
    message: String,
    code: ErrorCode,
    value: &str,
) -> DomainError {
    DomainError::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|_| {
        invalid_value_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

pub(crate) fn parse_optional_uuid(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<Uuid>, DomainError> {
    value.map(|raw| parse_uuid(raw, field)).transpose()
}

pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        invalid_value_error(
            field,
            format!("{} must be a date in YYYY-MM-DD form", field.as_str()),
            ErrorCode::InvalidDate,
            value,
        )
    })
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, DomainError> {
    value.map(|raw| parse_date(raw, field)).transpose()
}

pub(crate) fn parse_time(value: &str, field: FieldName) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| {
            invalid_value_error(
                field,
                format!("{} must be a time in HH:MM form", field.as_str()),
                ErrorCode::InvalidTime,
                value,
            )
        })
}

pub(crate) fn parse_role(value: &str, field: FieldName) -> Result<Role, DomainError> {
    value.parse().map_err(|_| {
        invalid_value_error(
            field,
            format!(
                "{} must be one of patient, doctor, lab_assistant",
                field.as_str()
            ),
            ErrorCode::InvalidRole,
            value,
        )
    })
}
