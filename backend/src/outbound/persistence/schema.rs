//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Calendar subscriptions owned by users.
    ///
    /// `id` is a `BIGSERIAL` primary key; `created_at` defaults to `now()`.
    subscriptions (id) {
        /// Primary key assigned by the sequence.
        id -> Int8,
        /// Owner reference (max 64 characters).
        user_id -> Varchar,
        /// Subscription type discriminator (max 32 characters).
        subscription_type -> Varchar,
        /// Calendar source URL.
        url -> Text,
        /// Insertion timestamp.
        created_at -> Timestamptz,
    }
}
