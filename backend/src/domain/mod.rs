//! Domain primitives, ports and services.
//!
//! Purpose: define the subscription entity, the business error returned to
//! callers, and the service that sits between inbound adapters and the
//! subscription repository. Nothing here depends on Actix or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic business error and its codes.
//! - Subscription, SubscriptionId, SubscriptionType, UserId: entity types.
//! - SubscriptionValidator, DefaultSubscriptionValidator: write-time checks.
//! - SubscriptionService / SubscriptionServiceError: the façade over the
//!   repository port.
//! - TraceId: request-scoped correlation identifier.

pub mod error;
pub mod ports;
pub mod subscription;
pub mod subscription_service;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::error::{DomainError as Error, ErrorCause, ErrorCode};
pub use self::subscription::{
    SUBSCRIPTION_TYPE_MAX, Subscription, SubscriptionId, SubscriptionIdValidationError,
    SubscriptionType, SubscriptionTypeValidationError,
};
pub use self::subscription_service::{SubscriptionService, SubscriptionServiceError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{USER_ID_MAX, UserId, UserIdValidationError};
pub use self::validation::{
    DefaultSubscriptionValidator, SUBSCRIPTION_URL_MAX, SUPPORTED_SCHEMES,
    SubscriptionValidationError, SubscriptionValidator, check_is_valid,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use calendar_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("no such subscription"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
