//! Port for subscription persistence.
//!
//! [`SubscriptionRepository`] is the data-access contract the subscription
//! service delegates to. Lookups that must yield exactly one entity report
//! the two distinguished failure kinds, [`SubscriptionRepositoryError::NotFound`]
//! and [`SubscriptionRepositoryError::MultipleFound`], alongside the general
//! connection and query channels.

use async_trait::async_trait;

use crate::domain::{Subscription, SubscriptionId, SubscriptionType, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by subscription repository adapters.
    pub enum SubscriptionRepositoryError {
        /// No entity matched a lookup that requires one.
        NotFound => "{message}",
        /// More than one entity matched a lookup expected to be unique.
        MultipleFound => "{message}",
        /// Repository connection could not be established.
        Connection =>
            "subscription repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query =>
            "subscription repository query failed: {message}",
    }
}

/// Data-access port for subscriptions.
///
/// # Contract
///
/// - Lists are ordered by identifier. `offset` skips rows and `limit` caps
///   them; `None` leaves the respective bound open.
/// - `find` and `find_by_type` return [`SubscriptionRepositoryError::NotFound`]
///   when nothing matches and [`SubscriptionRepositoryError::MultipleFound`]
///   when the filters are not selective enough.
/// - `insert` assigns the identifier and creation timestamp and returns the
///   stored value.
/// - `update` and `delete` require a persisted subscription and report
///   [`SubscriptionRepositoryError::NotFound`] when its row is gone.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// List a user's subscriptions.
    async fn find_all(
        &self,
        user_id: &UserId,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Subscription>, SubscriptionRepositoryError>;

    /// List a user's subscriptions of one type.
    async fn find_all_by_type(
        &self,
        user_id: &UserId,
        subscription_type: &SubscriptionType,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Subscription>, SubscriptionRepositoryError>;

    /// Count subscriptions, optionally restricted to one user.
    async fn count(&self, user_id: Option<UserId>) -> Result<u64, SubscriptionRepositoryError>;

    /// Count subscriptions of one type, optionally restricted to one user.
    async fn count_by_type(
        &self,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<u64, SubscriptionRepositoryError>;

    /// Fetch exactly one subscription by identifier.
    async fn find(
        &self,
        id: SubscriptionId,
        user_id: Option<UserId>,
    ) -> Result<Subscription, SubscriptionRepositoryError>;

    /// Fetch exactly one subscription by identifier and type.
    async fn find_by_type(
        &self,
        id: SubscriptionId,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<Subscription, SubscriptionRepositoryError>;

    /// Report whether a subscription exists.
    async fn does_exist(
        &self,
        id: SubscriptionId,
        user_id: Option<UserId>,
    ) -> Result<bool, SubscriptionRepositoryError>;

    /// Report whether a subscription of the given type exists.
    async fn does_exist_of_type(
        &self,
        id: SubscriptionId,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<bool, SubscriptionRepositoryError>;

    /// Persist a new subscription.
    async fn insert(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, SubscriptionRepositoryError>;

    /// Overwrite a persisted subscription.
    async fn update(&self, subscription: &Subscription) -> Result<(), SubscriptionRepositoryError>;

    /// Remove a persisted subscription.
    async fn delete(&self, subscription: &Subscription) -> Result<(), SubscriptionRepositoryError>;
}

/// Require a persisted identifier, reporting the gap as `NotFound`.
///
/// Shared by adapters for `update` and `delete`.
pub fn require_id(
    subscription: &Subscription,
) -> Result<SubscriptionId, SubscriptionRepositoryError> {
    subscription
        .id
        .ok_or_else(|| SubscriptionRepositoryError::not_found("subscription has not been persisted"))
}
