//! Shared validation helpers for inbound HTTP adapters.
//!
//! Path and query values arrive as raw strings and integers. These helpers
//! turn them into domain identifiers, reporting failures as `invalid_request`
//! errors whose `details` name the offending field and a stable code.

use serde_json::json;

use crate::domain::{
    Error, SubscriptionId, SubscriptionType, SubscriptionValidationError, UserId,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUserId,
    InvalidSubscriptionId,
    InvalidSubscriptionType,
    IdMismatch,
    InvalidUrl,
    UnsupportedScheme,
    MissingHost,
    UrlTooLong,
    UnsupportedType,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUserId => "invalid_user_id",
            Self::InvalidSubscriptionId => "invalid_subscription_id",
            Self::InvalidSubscriptionType => "invalid_subscription_type",
            Self::IdMismatch => "id_mismatch",
            Self::InvalidUrl => "invalid_url",
            Self::UnsupportedScheme => "unsupported_scheme",
            Self::MissingHost => "missing_host",
            Self::UrlTooLong => "url_too_long",
            Self::UnsupportedType => "unsupported_type",
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

    const fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const USER_ID: FieldName = FieldName::new("userId");
pub(crate) const SUBSCRIPTION_ID: FieldName = FieldName::new("id");
pub(crate) const SUBSCRIPTION_TYPE: FieldName = FieldName::new("subscriptionType");
pub(crate) const URL: FieldName = FieldName::new("url");

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_value_error(
    field: FieldName,
    code: ErrorCode,
    message: impl Into<String>,
    value: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value.into(),
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_user_id(value: &str) -> Result<UserId, Error> {
    UserId::new(value).map_err(|err| {
        field_value_error(USER_ID, ErrorCode::InvalidUserId, err.to_string(), value)
    })
}

pub(crate) fn parse_subscription_id(value: i64) -> Result<SubscriptionId, Error> {
    SubscriptionId::new(value).map_err(|err| {
        field_value_error(
            SUBSCRIPTION_ID,
            ErrorCode::InvalidSubscriptionId,
            err.to_string(),
            value.to_string(),
        )
    })
}

pub(crate) fn parse_subscription_type(value: &str) -> Result<SubscriptionType, Error> {
    SubscriptionType::new(value).map_err(|err| {
        field_value_error(
            SUBSCRIPTION_TYPE,
            ErrorCode::InvalidSubscriptionType,
            err.to_string(),
            value,
        )
    })
}

pub(crate) fn parse_optional_subscription_type(
    value: Option<&str>,
) -> Result<Option<SubscriptionType>, Error> {
    value.map(parse_subscription_type).transpose()
}

pub(crate) fn id_mismatch_error(path_id: SubscriptionId, body_id: SubscriptionId) -> Error {
    field_error(
        SUBSCRIPTION_ID,
        ErrorCode::IdMismatch,
        format!("body id {body_id} does not match path id {path_id}"),
    )
}

/// Translate a validator rejection into an `invalid_request` error.
pub(crate) fn subscription_validation_error(error: &SubscriptionValidationError) -> Error {
    let (field, code) = match error {
        SubscriptionValidationError::InvalidUrl { .. } => (URL, ErrorCode::InvalidUrl),
        SubscriptionValidationError::UnsupportedScheme { .. } => {
            (URL, ErrorCode::UnsupportedScheme)
        }
        SubscriptionValidationError::MissingHost => (URL, ErrorCode::MissingHost),
        SubscriptionValidationError::UrlTooLong { .. } => (URL, ErrorCode::UrlTooLong),
        SubscriptionValidationError::UnsupportedType { .. } => {
            (SUBSCRIPTION_TYPE, ErrorCode::UnsupportedType)
        }
    };
    field_error(field, code, error.to_string())
}
