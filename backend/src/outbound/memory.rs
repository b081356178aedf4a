//! In-memory subscription repository.
//!
//! Used when the server runs without a database and by black-box tests. The
//! adapter honours the same ordering, pagination and lookup semantics as the
//! Diesel repository so either can back the service.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use crate::domain::ports::{SubscriptionRepository, SubscriptionRepositoryError, require_id};
use crate::domain::{Subscription, SubscriptionId, SubscriptionType, UserId};

#[derive(Debug, Default)]
struct Store {
    rows: BTreeMap<SubscriptionId, Subscription>,
    last_id: i64,
}

/// Subscription repository backed by a mutex-guarded map.
#[derive(Clone)]
pub struct InMemorySubscriptionRepository {
    store: Arc<Mutex<Store>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemorySubscriptionRepository {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemorySubscriptionRepository {
    /// Create an empty repository stamping `created_at` from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, SubscriptionRepositoryError> {
        self.store.lock().map_err(|_| {
            warn!("in-memory subscription store poisoned");
            SubscriptionRepositoryError::connection("in-memory store poisoned")
        })
    }
}

fn matches_filters(
    subscription: &Subscription,
    user_id: Option<&UserId>,
    subscription_type: Option<&SubscriptionType>,
) -> bool {
    user_id.is_none_or(|user| &subscription.user_id == user)
        && subscription_type.is_none_or(|kind| &subscription.subscription_type == kind)
}

fn page(
    store: &Store,
    user_id: &UserId,
    subscription_type: Option<&SubscriptionType>,
    limit: Option<u32>,
    offset: Option<u32>,
) -> Vec<Subscription> {
    let skip = offset.map_or(0, |value| value as usize);
    let take = limit.map_or(usize::MAX, |value| value as usize);
    store
        .rows
        .values()
        .filter(|sub| matches_filters(sub, Some(user_id), subscription_type))
        .skip(skip)
        .take(take)
        .cloned()
        .collect()
}

fn tally(
    store: &Store,
    user_id: Option<&UserId>,
    subscription_type: Option<&SubscriptionType>,
) -> u64 {
    store
        .rows
        .values()
        .filter(|sub| matches_filters(sub, user_id, subscription_type))
        .count() as u64
}

fn lookup(
    store: &Store,
    id: SubscriptionId,
    user_id: Option<&UserId>,
    subscription_type: Option<&SubscriptionType>,
) -> Result<Subscription, SubscriptionRepositoryError> {
    let mut candidates = store
        .rows
        .range(id..=id)
        .map(|(_, sub)| sub)
        .filter(|sub| matches_filters(sub, user_id, subscription_type))
        .take(2);
    match (candidates.next(), candidates.next()) {
        (Some(found), None) => Ok(found.clone()),
        (None, _) => Err(SubscriptionRepositoryError::not_found(format!(
            "subscription {id} not found"
        ))),
        (Some(_), Some(_)) => Err(SubscriptionRepositoryError::multiple_found(format!(
            "multiple subscriptions match id {id}"
        ))),
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_all(
        &self,
        user_id: &UserId,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Subscription>, SubscriptionRepositoryError> {
        Ok(page(&*self.lock()?, user_id, None, limit, offset))
    }

    async fn find_all_by_type(
        &self,
        user_id: &UserId,
        subscription_type: &SubscriptionType,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Subscription>, SubscriptionRepositoryError> {
        Ok(page(
            &*self.lock()?,
            user_id,
            Some(subscription_type),
            limit,
            offset,
        ))
    }

    async fn count(&self, user_id: Option<UserId>) -> Result<u64, SubscriptionRepositoryError> {
        Ok(tally(&*self.lock()?, user_id.as_ref(), None))
    }

    async fn count_by_type(
        &self,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<u64, SubscriptionRepositoryError> {
        Ok(tally(
            &*self.lock()?,
            user_id.as_ref(),
            Some(subscription_type),
        ))
    }

    async fn find(
        &self,
        id: SubscriptionId,
        user_id: Option<UserId>,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        lookup(&*self.lock()?, id, user_id.as_ref(), None)
    }

    async fn find_by_type(
        &self,
        id: SubscriptionId,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        lookup(
            &*self.lock()?,
            id,
            user_id.as_ref(),
            Some(subscription_type),
        )
    }

    async fn does_exist(
        &self,
        id: SubscriptionId,
        user_id: Option<UserId>,
    ) -> Result<bool, SubscriptionRepositoryError> {
        let store = self.lock()?;
        Ok(store
            .rows
            .get(&id)
            .is_some_and(|sub| matches_filters(sub, user_id.as_ref(), None)))
    }

    async fn does_exist_of_type(
        &self,
        id: SubscriptionId,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<bool, SubscriptionRepositoryError> {
        let store = self.lock()?;
        Ok(store.rows.get(&id).is_some_and(|sub| {
            matches_filters(sub, user_id.as_ref(), Some(subscription_type))
        }))
    }

    async fn insert(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        let mut store = self.lock()?;
        let id = SubscriptionId::new(store.last_id + 1)
            .map_err(|err| SubscriptionRepositoryError::query(err.to_string()))?;
        let mut stored = subscription.clone().with_id(id);
        stored.created_at = Some(self.clock.utc());
        store.last_id = id.get();
        store.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), SubscriptionRepositoryError> {
        let id = require_id(subscription)?;
        let mut store = self.lock()?;
        let Some(existing) = store.rows.get_mut(&id) else {
            return Err(SubscriptionRepositoryError::not_found(format!(
                "subscription {id} not found"
            )));
        };
        let created_at = existing.created_at;
        *existing = subscription.clone();
        existing.created_at = created_at;
        Ok(())
    }

    async fn delete(&self, subscription: &Subscription) -> Result<(), SubscriptionRepositoryError> {
        let id = require_id(subscription)?;
        let mut store = self.lock()?;
        store
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| {
                SubscriptionRepositoryError::not_found(format!("subscription {id} not found"))
            })
    }
}
