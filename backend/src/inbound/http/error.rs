//! Rendering of domain errors as HTTP responses.
//!
//! The domain `Error` stays free of Actix types; this module supplies its
//! `ResponseError` impl, the service-error mapping used by handlers, and
//! extractor configs so malformed bodies, paths and query strings answer with
//! the same JSON payload as every other failure.

use std::borrow::Cow;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::domain::ports::SubscriptionRepositoryError;
use crate::domain::{Error, ErrorCode, SubscriptionServiceError, TRACE_ID_HEADER};

use super::validation::subscription_validation_error;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

/// The payload a client is allowed to see.
///
/// Internal errors keep only their trace id; message and details are
/// replaced so storage failures never leak.
fn client_view(error: &Error) -> Cow<'_, Error> {
    if error.code() != ErrorCode::InternalError {
        return Cow::Borrowed(error);
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    Cow::Owned(match error.trace_id() {
        Some(id) => redacted.with_trace_id(id),
        None => redacted,
    })
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id));
        }
        response.json(client_view(self).as_ref())
    }
}

impl From<SubscriptionServiceError> for Error {
    fn from(err: SubscriptionServiceError) -> Self {
        match err {
            SubscriptionServiceError::Business(business) => business,
            SubscriptionServiceError::Validation(rejection) => {
                subscription_validation_error(&rejection).with_cause(rejection)
            }
            SubscriptionServiceError::Repository(
                failure @ SubscriptionRepositoryError::Connection { .. },
            ) => {
                warn!(error = %failure, "subscription storage unavailable");
                Self::service_unavailable("subscription storage unavailable").with_cause(failure)
            }
            SubscriptionServiceError::Repository(failure) => {
                error!(error = %failure, "subscription repository failure");
                Self::internal(failure.to_string()).with_cause(failure)
            }
        }
    }
}

fn malformed(kind: &'static str, reason: String) -> actix_web::Error {
    debug!(%kind, %reason, "request rejected by extractor");
    Error::invalid_request(format!("malformed {kind}"))
        .with_details(json!({ "code": format!("malformed_{kind}"), "reason": reason }))
        .into()
}

/// JSON body extractor settings that reject bad bodies with `invalid_request`.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err: JsonPayloadError, _: &HttpRequest| malformed("body", err.to_string()))
}

/// Path extractor settings that reject unparsable segments with `invalid_request`.
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err: PathError, _: &HttpRequest| malformed("path", err.to_string()))
}

/// Query extractor settings that reject bad query strings with `invalid_request`.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err: QueryPayloadError, _: &HttpRequest| malformed("query", err.to_string()))
}
