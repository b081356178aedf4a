//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module; all database errors are mapped to
//! `SubscriptionRepositoryError` variants before they leave it.
//!
//! # Example
//!
//! ```no_run
//! use calendar_backend::outbound::persistence::{
//!     DbPool, DieselSubscriptionRepository, PoolConfig, run_pending_migrations,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://calendar@localhost/calendar";
//! run_pending_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let repo = DieselSubscriptionRepository::new(pool);
//! # Ok(())
//! # }
//! ```

mod diesel_subscription_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
