//! PostgreSQL-backed `SubscriptionRepository` implementation using Diesel ORM.
//!
//! Single-entity lookups load at most two candidate rows so the adapter can
//! tell "nothing matched" from "the filters were not selective enough"
//! without scanning the table.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::ports::{SubscriptionRepository, SubscriptionRepositoryError, require_id};
use crate::domain::{Subscription, SubscriptionId, SubscriptionType, UserId};

use super::models::{NewSubscriptionRow, SubscriptionRow, SubscriptionUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::subscriptions;

/// Diesel-backed implementation of the `SubscriptionRepository` port.
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SubscriptionRepositoryError {
    SubscriptionRepositoryError::connection(error.to_string())
}

/// Collapse Diesel failures into the port's `Connection`/`Query` variants.
///
/// Diesel's own `NotFound` stays a query failure; lookups detect absence
/// from the rows they load.
fn map_diesel_error(error: diesel::result::Error) -> SubscriptionRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "subscription statement rejected by database"
            );
            match kind {
                DatabaseErrorKind::ClosedConnection => {
                    SubscriptionRepositoryError::connection("database connection closed")
                }
                DatabaseErrorKind::CheckViolation | DatabaseErrorKind::NotNullViolation => {
                    SubscriptionRepositoryError::query("subscription violates a table constraint")
                }
                DatabaseErrorKind::SerializationFailure => {
                    SubscriptionRepositoryError::query("concurrent subscription update conflict")
                }
                _ => SubscriptionRepositoryError::query("database error"),
            }
        }
        DieselError::NotFound => SubscriptionRepositoryError::query("record not found"),
        other => {
            debug!(error = %other, "subscription statement failed");
            SubscriptionRepositoryError::query("database query error")
        }
    }
}

fn not_found(id: SubscriptionId) -> SubscriptionRepositoryError {
    SubscriptionRepositoryError::not_found(format!("subscription {id} not found"))
}

/// Convert a database row to a domain subscription.
fn row_to_subscription(row: SubscriptionRow) -> Result<Subscription, SubscriptionRepositoryError> {
    let corrupt = |field: &str, err: &dyn std::fmt::Display| {
        warn!(id = row.id, field, %err, "stored subscription failed validation");
        SubscriptionRepositoryError::query(format!("stored subscription has invalid {field}"))
    };
    let id = SubscriptionId::new(row.id).map_err(|err| corrupt("id", &err))?;
    let user_id = UserId::new(&row.user_id).map_err(|err| corrupt("user_id", &err))?;
    let subscription_type = SubscriptionType::new(&row.subscription_type)
        .map_err(|err| corrupt("subscription_type", &err))?;

    let mut subscription = Subscription::new(user_id, subscription_type, row.url).with_id(id);
    subscription.created_at = Some(row.created_at);
    Ok(subscription)
}

/// Boxed query over `subscriptions` narrowed by the optional filters.
fn filtered<'a>(
    user_id: Option<&'a UserId>,
    subscription_type: Option<&'a SubscriptionType>,
) -> subscriptions::BoxedQuery<'a, Pg> {
    let mut query = subscriptions::table.into_boxed();
    if let Some(user) = user_id {
        query = query.filter(subscriptions::user_id.eq(user.as_ref()));
    }
    if let Some(kind) = subscription_type {
        query = query.filter(subscriptions::subscription_type.eq(kind.as_str()));
    }
    query
}

impl DieselSubscriptionRepository {
    async fn list(
        &self,
        user_id: &UserId,
        subscription_type: Option<&SubscriptionType>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Subscription>, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = filtered(Some(user_id), subscription_type)
            .order(subscriptions::id.asc())
            .select(SubscriptionRow::as_select());
        if let Some(max_rows) = limit {
            query = query.limit(i64::from(max_rows));
        }
        if let Some(skipped) = offset {
            query = query.offset(i64::from(skipped));
        }

        let rows: Vec<SubscriptionRow> = query
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_subscription).collect()
    }

    async fn tally(
        &self,
        user_id: Option<&UserId>,
        subscription_type: Option<&SubscriptionType>,
        id: Option<SubscriptionId>,
    ) -> Result<u64, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = filtered(user_id, subscription_type);
        if let Some(row_id) = id {
            query = query.filter(subscriptions::id.eq(row_id.get()));
        }
        let total: i64 = query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(total).map_err(|_| SubscriptionRepositoryError::query("negative row count"))
    }

    async fn lookup(
        &self,
        id: SubscriptionId,
        user_id: Option<&UserId>,
        subscription_type: Option<&SubscriptionType>,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SubscriptionRow> = filtered(user_id, subscription_type)
            .filter(subscriptions::id.eq(id.get()))
            .select(SubscriptionRow::as_select())
            .limit(2)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut candidates = rows.into_iter();
        match (candidates.next(), candidates.next()) {
            (Some(row), None) => row_to_subscription(row),
            (None, _) => Err(not_found(id)),
            (Some(_), Some(_)) => Err(SubscriptionRepositoryError::multiple_found(format!(
                "multiple subscriptions match id {id}"
            ))),
        }
    }
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn find_all(
        &self,
        user_id: &UserId,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Subscription>, SubscriptionRepositoryError> {
        self.list(user_id, None, limit, offset).await
    }

    async fn find_all_by_type(
        &self,
        user_id: &UserId,
        subscription_type: &SubscriptionType,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Subscription>, SubscriptionRepositoryError> {
        self.list(user_id, Some(subscription_type), limit, offset)
            .await
    }

    async fn count(&self, user_id: Option<UserId>) -> Result<u64, SubscriptionRepositoryError> {
        self.tally(user_id.as_ref(), None, None).await
    }

    async fn count_by_type(
        &self,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<u64, SubscriptionRepositoryError> {
        self.tally(user_id.as_ref(), Some(subscription_type), None)
            .await
    }

    async fn find(
        &self,
        id: SubscriptionId,
        user_id: Option<UserId>,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        self.lookup(id, user_id.as_ref(), None).await
    }

    async fn find_by_type(
        &self,
        id: SubscriptionId,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        self.lookup(id, user_id.as_ref(), Some(subscription_type))
            .await
    }

    async fn does_exist(
        &self,
        id: SubscriptionId,
        user_id: Option<UserId>,
    ) -> Result<bool, SubscriptionRepositoryError> {
        let matches = self.tally(user_id.as_ref(), None, Some(id)).await?;
        Ok(matches > 0)
    }

    async fn does_exist_of_type(
        &self,
        id: SubscriptionId,
        subscription_type: &SubscriptionType,
        user_id: Option<UserId>,
    ) -> Result<bool, SubscriptionRepositoryError> {
        let matches = self
            .tally(user_id.as_ref(), Some(subscription_type), Some(id))
            .await?;
        Ok(matches > 0)
    }

    async fn insert(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewSubscriptionRow {
            user_id: subscription.user_id.as_ref(),
            subscription_type: subscription.subscription_type.as_str(),
            url: &subscription.url,
        };
        let row: SubscriptionRow = diesel::insert_into(subscriptions::table)
            .values(&new_row)
            .returning(SubscriptionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_subscription(row)
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), SubscriptionRepositoryError> {
        let id = require_id(subscription)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = SubscriptionUpdate {
            user_id: subscription.user_id.as_ref(),
            subscription_type: subscription.subscription_type.as_str(),
            url: &subscription.url,
        };
        let updated_rows = diesel::update(subscriptions::table.find(id.get()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated_rows == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, subscription: &Subscription) -> Result<(), SubscriptionRepositoryError> {
        let id = require_id(subscription)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted_rows = diesel::delete(subscriptions::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if deleted_rows == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
