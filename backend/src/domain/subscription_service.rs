//! Subscription domain service.
//!
//! [`SubscriptionService`] is a thin façade over a [`SubscriptionRepository`].
//! Most operations forward their arguments and return the repository result
//! untouched. Single-entity lookups translate the two distinguished
//! repository failures into business errors:
//!
//! | Repository failure | Business error |
//! |---|---|
//! | `NotFound` | [`NotFound`](crate::domain::ErrorCode::NotFound) (404) |
//! | `MultipleFound` | [`InternalError`](crate::domain::ErrorCode::InternalError) (500) |
//!
//! Writes run the injected [`SubscriptionValidator`] first and never reach
//! persistence when it rejects the subscription.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ports::{
    SubscriptionCommand, SubscriptionQuery, SubscriptionRepository, SubscriptionRepositoryError,
};
use crate::domain::validation::check_is_valid;
use crate::domain::{
    DefaultSubscriptionValidator, Error, Subscription, SubscriptionId, SubscriptionType,
    SubscriptionValidationError, SubscriptionValidator, UserId,
};

/// Failures surfaced by [`SubscriptionService`].
#[derive(Debug, Clone, Error)]
pub enum SubscriptionServiceError {
    /// A translated lookup failure.
    #[error(transparent)]
    Business(#[from] Error),
    /// The validator rejected the subscription.
    #[error(transparent)]
    Validation(#[from] SubscriptionValidationError),
    /// Any other repository failure, unchanged.
    #[error(transparent)]
    Repository(#[from] SubscriptionRepositoryError),
}

/// Subscription service implementing the driving ports.
pub struct SubscriptionService<R, V = DefaultSubscriptionValidator> {
    repository: Arc<R>,
    validator: Arc<V>,
}

impl<R, V> Clone for SubscriptionService<R, V> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            validator: Arc::clone(&self.validator),
        }
    }
}

impl<R> SubscriptionService<R> {
    /// Create a service using the standard validation policy.
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_validator(repository, Arc::new(DefaultSubscriptionValidator::default()))
    }
}

impl<R, V> SubscriptionService<R, V> {
    /// Create a service with a custom validator.
    pub fn with_validator(repository: Arc<R>, validator: Arc<V>) -> Self {
        Self {
            repository,
            validator,
        }
    }
}

impl<R, V> SubscriptionService<R, V>
where
    R: SubscriptionRepository,
    V: SubscriptionValidator,
{
    fn translate_lookup_error(error: SubscriptionRepositoryError) -> SubscriptionServiceError {
        let business = match &error {
            SubscriptionRepositoryError::NotFound { .. } => Error::not_found(error.message()),
            SubscriptionRepositoryError::MultipleFound { .. } => Error::internal(error.message()),
            SubscriptionRepositoryError::Connection { .. }
            | SubscriptionRepositoryError::Query { .. } => return error.into(),
        };
        business.with_cause(error).into()
    }
}

#[async_trait]
impl<R, V> SubscriptionQuery for SubscriptionService<R, V>
where
    R: SubscriptionRepository,
    V: SubscriptionValidator,
{
    async fn find_all(
        &self,
        user_id: &UserId,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Subscription>, SubscriptionServiceError> {
        Ok(self.repository.find_all(user_id, limit, offset).await?)
    }

    async fn find_all_by_type(
        &self,
        user_id: &UserId,
        subscription_type: &SubscriptionType,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Subscription>, SubscriptionServiceError> {
        Ok(self
            .repository
            .find_all_by_type(user_id, subscription_type, limit, offset)
            .await?)
    }

    async fn count(&self, user_id: Option<UserId>) -> Result<u64, SubscriptionServiceError> {
        Ok(self.repository.count(user_id).await?)
    }

    async fn count_by_type(
        &self,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<u64, SubscriptionServiceError> {
        Ok(self
            .repository
            .count_by_type(subscription_type, user_id)
            .await?)
    }

    async fn find(
        &self,
        id: SubscriptionId,
        user_id: Option<UserId>,
    ) -> Result<Subscription, SubscriptionServiceError> {
        self.repository
            .find(id, user_id)
            .await
            .map_err(Self::translate_lookup_error)
    }

    async fn find_by_type(
        &self,
        id: SubscriptionId,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<Subscription, SubscriptionServiceError> {
        self.repository
            .find_by_type(id, subscription_type, user_id)
            .await
            .map_err(Self::translate_lookup_error)
    }

    async fn does_exist(
        &self,
        id: SubscriptionId,
        user_id: Option<UserId>,
    ) -> Result<bool, SubscriptionServiceError> {
        Ok(self.repository.does_exist(id, user_id).await?)
    }

    async fn does_exist_of_type(
        &self,
        id: SubscriptionId,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<bool, SubscriptionServiceError> {
        Ok(self
            .repository
            .does_exist_of_type(id, subscription_type, user_id)
            .await?)
    }
}

#[async_trait]
impl<R, V> SubscriptionCommand for SubscriptionService<R, V>
where
    R: SubscriptionRepository,
    V: SubscriptionValidator,
{
    async fn create(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, SubscriptionServiceError> {
        check_is_valid(self.validator.as_ref(), &subscription)?;
        Ok(self.repository.insert(&subscription).await?)
    }

    async fn update(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, SubscriptionServiceError> {
        check_is_valid(self.validator.as_ref(), &subscription)?;
        self.repository.update(&subscription).await?;
        Ok(subscription)
    }

    async fn delete(&self, subscription: Subscription) -> Result<(), SubscriptionServiceError> {
        Ok(self.repository.delete(&subscription).await?)
    }
}

#[cfg(test)]
#[path = "subscription_service_tests.rs"]
mod tests;
