//! Driving port for subscription reads.
//!
//! Inbound adapters list, count and look up subscriptions through this port
//! without depending on the persistence adapter in use.

use async_trait::async_trait;

use crate::domain::{
    Subscription, SubscriptionId, SubscriptionServiceError, SubscriptionType, UserId,
};

/// Domain use-case port for reading subscriptions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionQuery: Send + Sync {
    /// List a user's subscriptions.
    async fn find_all(
        &self,
        user_id: &UserId,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Subscription>, SubscriptionServiceError>;

    /// List a user's subscriptions of one type.
    async fn find_all_by_type(
        &self,
        user_id: &UserId,
        subscription_type: &SubscriptionType,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Subscription>, SubscriptionServiceError>;

    /// Count subscriptions, optionally for one user.
    async fn count(&self, user_id: Option<UserId>) -> Result<u64, SubscriptionServiceError>;

    /// Count subscriptions of one type, optionally for one user.
    async fn count_by_type(
        &self,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<u64, SubscriptionServiceError>;

    /// Fetch one subscription.
    ///
    /// # Errors
    ///
    /// Absence surfaces as a `NotFound` business error and an ambiguous
    /// match as an `InternalError` business error.
    async fn find(
        &self,
        id: SubscriptionId,
        user_id: Option<UserId>,
    ) -> Result<Subscription, SubscriptionServiceError>;

    /// Fetch one subscription of the given type.
    ///
    /// # Errors
    ///
    /// Same translation as [`SubscriptionQuery::find`].
    async fn find_by_type(
        &self,
        id: SubscriptionId,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<Subscription, SubscriptionServiceError>;

    /// Report whether a subscription exists.
    async fn does_exist(
        &self,
        id: SubscriptionId,
        user_id: Option<UserId>,
    ) -> Result<bool, SubscriptionServiceError>;

    /// Report whether a subscription of the given type exists.
    async fn does_exist_of_type(
        &self,
        id: SubscriptionId,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<bool, SubscriptionServiceError>;
}
