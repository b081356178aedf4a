//! Calendar subscription entity and its identifiers.
//!
//! A subscription links a user to an external calendar source. The service
//! layer treats the entity as opaque: it validates it and hands it to the
//! repository, which owns identifiers and creation timestamps.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::UserId;

/// Maximum length of a subscription type discriminator.
pub const SUBSCRIPTION_TYPE_MAX: usize = 32;

/// Validation errors returned when constructing subscription identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionIdValidationError {
    /// Identifiers are assigned by the database sequence and start at one.
    #[error("subscription id must be positive, got {value}")]
    NotPositive {
        /// Rejected raw value.
        value: i64,
    },
}

/// Validation errors returned by [`SubscriptionType::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionTypeValidationError {
    /// The discriminator is empty.
    #[error("subscription type must not be empty")]
    Empty,
    /// The discriminator exceeds [`SUBSCRIPTION_TYPE_MAX`] characters.
    #[error("subscription type must be at most {max} characters")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The discriminator contains characters outside `[a-z0-9_-]`.
    #[error("subscription type may only contain lowercase letters, digits, '-' or '_'")]
    InvalidCharacters,
}

/// Identifier of a persisted subscription.
///
/// # Examples
/// ```
/// use calendar_backend::domain::SubscriptionId;
///
/// let id = SubscriptionId::new(42).expect("positive id");
/// assert_eq!(id.get(), 42);
/// assert!(SubscriptionId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SubscriptionId(i64);

impl SubscriptionId {
    /// Validate and wrap a raw identifier.
    pub fn new(value: i64) -> Result<Self, SubscriptionIdValidationError> {
        if value <= 0 {
            return Err(SubscriptionIdValidationError::NotPositive { value });
        }
        Ok(Self(value))
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for SubscriptionId {
    type Error = SubscriptionIdValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubscriptionId> for i64 {
    fn from(value: SubscriptionId) -> Self {
        value.0
    }
}

/// Discriminator separating kinds of subscriptions (for example `personal`
/// or `webcal`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubscriptionType(String);

impl SubscriptionType {
    /// Validate and construct a discriminator.
    pub fn new(value: impl AsRef<str>) -> Result<Self, SubscriptionTypeValidationError> {
        Self::from_owned(value.as_ref().to_owned())
    }

    fn from_owned(value: String) -> Result<Self, SubscriptionTypeValidationError> {
        if value.is_empty() {
            return Err(SubscriptionTypeValidationError::Empty);
        }
        if value.chars().count() > SUBSCRIPTION_TYPE_MAX {
            return Err(SubscriptionTypeValidationError::TooLong {
                max: SUBSCRIPTION_TYPE_MAX,
            });
        }
        let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_';
        if !value.chars().all(allowed) {
            return Err(SubscriptionTypeValidationError::InvalidCharacters);
        }
        Ok(Self(value))
    }

    /// Borrow the discriminator as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for SubscriptionType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SubscriptionType> for String {
    fn from(value: SubscriptionType) -> Self {
        value.0
    }
}

impl TryFrom<String> for SubscriptionType {
    type Error = SubscriptionTypeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// A user's subscription to an external calendar source.
///
/// `id` and `created_at` stay `None` until a repository persists the value.
/// The source `url` is kept as submitted; validators decide whether it is
/// acceptable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Storage-assigned identifier; `None` before the first insert.
    pub id: Option<SubscriptionId>,
    /// Owner of the subscription.
    pub user_id: UserId,
    /// Kind of feed, such as `webcal` or `caldav`.
    pub subscription_type: SubscriptionType,
    /// Source calendar URL.
    pub url: String,
    /// Insert time, stamped by the repository.
    pub created_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Create an unsaved subscription.
    ///
    /// # Examples
    /// ```
    /// use calendar_backend::domain::{Subscription, SubscriptionType, UserId};
    ///
    /// let sub = Subscription::new(
    ///     UserId::new("alice").expect("valid user"),
    ///     SubscriptionType::new("webcal").expect("valid type"),
    ///     "https://example.org/holidays.ics",
    /// );
    /// assert!(sub.id.is_none());
    /// ```
    pub fn new(
        user_id: UserId,
        subscription_type: SubscriptionType,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            subscription_type,
            url: url.into(),
            created_at: None,
        }
    }

    /// Return the subscription with the given identifier attached.
    #[must_use]
    pub fn with_id(mut self, id: SubscriptionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether the subscription has been assigned an identifier.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
