//! Driving port for subscription writes.

use async_trait::async_trait;

use crate::domain::{Subscription, SubscriptionServiceError};

/// Domain use-case port for creating, updating and removing subscriptions.
///
/// `create` and `update` validate the subscription before it reaches
/// persistence; a rejection surfaces as
/// [`SubscriptionServiceError::Validation`] and nothing is written.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionCommand: Send + Sync {
    /// Validate and persist a new subscription.
    async fn create(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, SubscriptionServiceError>;

    /// Validate and overwrite a subscription, returning the value passed in.
    async fn update(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, SubscriptionServiceError>;

    /// Remove a subscription.
    async fn delete(&self, subscription: Subscription) -> Result<(), SubscriptionServiceError>;
}
