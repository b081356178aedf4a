//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::subscriptions;

/// Row struct for reading from the subscriptions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubscriptionRow {
    pub id: i64,
    pub user_id: String,
    pub subscription_type: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating subscription records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub(crate) struct NewSubscriptionRow<'a> {
    pub user_id: &'a str,
    pub subscription_type: &'a str,
    pub url: &'a str,
}

/// Changeset struct for overwriting subscription records.
///
/// `created_at` is left untouched on update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = subscriptions)]
pub(crate) struct SubscriptionUpdate<'a> {
    pub user_id: &'a str,
    pub subscription_type: &'a str,
    pub url: &'a str,
}
