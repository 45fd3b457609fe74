//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every client-input failure becomes an `invalid_request` error whose
//! `details` name the offending field and a stable code.

use std::fmt::Display;

use actix_web::HttpRequest;
use actix_web::error::{JsonPayloadError, QueryPayloadError};
use chrono::NaiveDate;
use pagination::PageRequestError;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    AnimeValidationError, CredentialValidationError, Error, PlaylistValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidDate,
    InvalidBody,
    InvalidQuery,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidBody => "invalid_body",
            ErrorCode::InvalidQuery => "invalid_query",
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

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Domain validation failures that know which request field they concern.
pub(crate) trait FieldViolation: Display {
    fn field(&self) -> &'static str;
    fn code(&self) -> &'static str;
}

impl FieldViolation for CredentialValidationError {
    fn field(&self) -> &'static str {
        CredentialValidationError::field(self)
    }

    fn code(&self) -> &'static str {
        CredentialValidationError::code(self)
    }
}

impl FieldViolation for AnimeValidationError {
    fn field(&self) -> &'static str {
        AnimeValidationError::field(self)
    }

    fn code(&self) -> &'static str {
        AnimeValidationError::code(self)
    }
}

impl FieldViolation for PlaylistValidationError {
    fn field(&self) -> &'static str {
        PlaylistValidationError::field(self)
    }

    fn code(&self) -> &'static str {
        PlaylistValidationError::code(self)
    }
}

impl FieldViolation for PageRequestError {
    fn field(&self) -> &'static str {
        match self {
            PageRequestError::ZeroPage => "page",
            PageRequestError::LimitOutOfRange { .. } => "limit",
        }
    }

    fn code(&self) -> &'static str {
        "out_of_range"
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn with_code(self, code: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code,
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }

    fn with_index(self, code: ErrorCode, index: usize, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "index": index,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

/// Convert a domain validation failure into an `invalid_request` error.
pub(crate) fn field_error<E: FieldViolation>(err: E) -> Error {
    ValidationError::new(err.field(), err.to_string()).with_code(err.code())
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn invalid_uuid_index_error(field: FieldName, index: usize, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must contain valid UUIDs")).with_index(
        ErrorCode::InvalidUuid,
        index,
        value,
    )
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_uuid_list(values: Vec<String>, field: FieldName) -> Result<Vec<Uuid>, Error> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            Uuid::parse_str(&value).map_err(|_| invalid_uuid_index_error(field, index, &value))
        })
        .collect()
}

/// Parse an optional calendar date.
///
/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp, of which only the date
/// part is kept. Blank strings count as absent.
pub(crate) fn parse_optional_date(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    let Some(raw) = value.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| {
            chrono::DateTime::parse_from_rfc3339(trimmed).map(|timestamp| timestamp.date_naive())
        })
        .map(Some)
        .map_err(|_| {
            let name = field.as_str();
            ValidationError::new(name, format!("{name} must be a date (YYYY-MM-DD)"))
                .with_value(ErrorCode::InvalidDate, trimmed)
        })
}

/// Map JSON body extraction failures to `invalid_request` errors.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected JSON payload");
    Error::invalid_request(format!("invalid JSON body: {err}"))
        .with_details(json!({ "code": ErrorCode::InvalidBody.as_str() }))
        .into()
}

/// Map query-string extraction failures to `invalid_request` errors.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected query string");
    Error::invalid_request(format!("invalid query string: {err}"))
        .with_details(json!({ "code": ErrorCode::InvalidQuery.as_str() }))
        .into()
}

#[cfg(test)]
mod tests {
    //! Detail payload coverage for validation helpers.
    use super::*;
    use crate::domain::ErrorCode as DomainErrorCode;
    use rstest::rstest;

    const ANIME_IDS: FieldName = FieldName::new("animeIds");

    #[rstest]
    fn field_error_carries_field_and_code() {
        let err = field_error(PlaylistValidationError::EmptyTitle);
        assert_eq!(err.code(), DomainErrorCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "title", "code": "empty_value" }))
        );
    }

    #[rstest]
    #[case(PageRequestError::ZeroPage, "page")]
    #[case(PageRequestError::LimitOutOfRange { max: 100 }, "limit")]
    fn page_errors_name_their_parameter(#[case] err: PageRequestError, #[case] field: &str) {
        let err = field_error(err);
        assert_eq!(
            err.details(),
            Some(&json!({ "field": field, "code": "out_of_range" }))
        );
    }

    #[rstest]
    fn uuid_list_reports_failing_index() {
        let err = parse_uuid_list(
            vec![Uuid::nil().to_string(), "nope".to_owned()],
            ANIME_IDS,
        )
        .expect_err("invalid entry");
        assert_eq!(
            err.details(),
            Some(&json!({
                "field": "animeIds",
                "index": 1,
                "value": "nope",
                "code": "invalid_uuid",
            }))
        );
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("  "), None)]
    #[case(Some("1998-04-03"), NaiveDate::from_ymd_opt(1998, 4, 3))]
    #[case(Some("1998-04-03T00:00:00+09:00"), NaiveDate::from_ymd_opt(1998, 4, 3))]
    fn optional_dates_parse(#[case] raw: Option<&str>, #[case] expected: Option<NaiveDate>) {
        let parsed = parse_optional_date(raw.map(str::to_owned), FieldName::new("creationDate"))
            .expect("valid date");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn malformed_dates_are_rejected() {
        let err = parse_optional_date(Some("April".into()), FieldName::new("creationDate"))
            .expect_err("invalid date");
        assert_eq!(err.code(), DomainErrorCode::InvalidRequest);
    }
}
