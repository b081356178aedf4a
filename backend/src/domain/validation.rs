//! Validation collaborator for subscriptions.
//!
//! Services call [`check_is_valid`] before forwarding a subscription to
//! persistence. The policy lives behind the [`SubscriptionValidator`] port so
//! deployments can tighten it without touching the service.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;
use url::Url;

use super::{Subscription, SubscriptionType};

/// Maximum accepted length of a subscription source URL, in bytes.
pub const SUBSCRIPTION_URL_MAX: usize = 2048;

/// URL schemes accepted by [`DefaultSubscriptionValidator`].
pub const SUPPORTED_SCHEMES: [&str; 4] = ["http", "https", "webcal", "webcals"];

/// Reasons a subscription is rejected before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionValidationError {
    /// The source URL could not be parsed.
    #[error("subscription url is invalid: {message}")]
    InvalidUrl {
        /// Parser diagnostic.
        message: String,
    },
    /// The source URL uses a scheme outside [`SUPPORTED_SCHEMES`].
    #[error("subscription url scheme `{scheme}` is not supported")]
    UnsupportedScheme {
        /// Rejected scheme.
        scheme: String,
    },
    /// The source URL has no host component.
    #[error("subscription url must include a host")]
    MissingHost,
    /// The source URL exceeds [`SUBSCRIPTION_URL_MAX`] bytes.
    #[error("subscription url must be at most {max} bytes")]
    UrlTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The subscription type is not enabled for this deployment.
    #[error("subscription type `{subscription_type}` is not supported")]
    UnsupportedType {
        /// Rejected discriminator.
        subscription_type: String,
    },
}

/// Port deciding whether a subscription may be persisted.
#[cfg_attr(test, mockall::automock)]
pub trait SubscriptionValidator: Send + Sync {
    /// Accept or reject the subscription.
    fn validate(&self, subscription: &Subscription) -> Result<(), SubscriptionValidationError>;
}

/// Run a validator against a subscription, logging rejections.
pub fn check_is_valid<V>(
    validator: &V,
    subscription: &Subscription,
) -> Result<(), SubscriptionValidationError>
where
    V: SubscriptionValidator + ?Sized,
{
    validator.validate(subscription).inspect_err(|error| {
        debug!(
            %error,
            user_id = %subscription.user_id,
            subscription_type = %subscription.subscription_type,
            "subscription rejected by validator"
        );
    })
}

/// Standard validation policy.
///
/// Accepts any well-formed calendar URL over a supported scheme. When an
/// allow-list is configured, the subscription type must also appear on it.
///
/// # Examples
/// ```
/// use calendar_backend::domain::{
///     DefaultSubscriptionValidator, Subscription, SubscriptionType, SubscriptionValidator, UserId,
/// };
///
/// let validator = DefaultSubscriptionValidator::default();
/// let sub = Subscription::new(
///     UserId::new("alice").expect("valid user"),
///     SubscriptionType::new("webcal").expect("valid type"),
///     "webcal://example.org/holidays.ics",
/// );
/// assert!(validator.validate(&sub).is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultSubscriptionValidator {
    allowed_types: Option<BTreeSet<SubscriptionType>>,
}

impl DefaultSubscriptionValidator {
    /// Restrict accepted subscription types to the given set.
    #[must_use]
    pub fn with_allowed_types<I>(types: I) -> Self
    where
        I: IntoIterator<Item = SubscriptionType>,
    {
        Self {
            allowed_types: Some(types.into_iter().collect()),
        }
    }

    fn validate_url(raw: &str) -> Result<(), SubscriptionValidationError> {
        if raw.len() > SUBSCRIPTION_URL_MAX {
            return Err(SubscriptionValidationError::UrlTooLong {
                max: SUBSCRIPTION_URL_MAX,
            });
        }
        let url = Url::parse(raw).map_err(|err| SubscriptionValidationError::InvalidUrl {
            message: err.to_string(),
        })?;
        if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
            return Err(SubscriptionValidationError::UnsupportedScheme {
                scheme: url.scheme().to_owned(),
            });
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(SubscriptionValidationError::MissingHost);
        }
        Ok(())
    }

    fn validate_type(
        &self,
        subscription_type: &SubscriptionType,
    ) -> Result<(), SubscriptionValidationError> {
        match &self.allowed_types {
            Some(allowed) if !allowed.contains(subscription_type) => {
                Err(SubscriptionValidationError::UnsupportedType {
                    subscription_type: subscription_type.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl SubscriptionValidator for DefaultSubscriptionValidator {
    fn validate(&self, subscription: &Subscription) -> Result<(), SubscriptionValidationError> {
        self.validate_type(&subscription.subscription_type)?;
        Self::validate_url(&subscription.url)
    }
}
