//! HTTP server configuration object.

use std::net::SocketAddr;

use calendar_backend::domain::DefaultSubscriptionValidator;
use calendar_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) validator: DefaultSubscriptionValidator,
}

impl ServerConfig {
    /// Configuration that serves from the in-memory store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            validator: DefaultSubscriptionValidator::default(),
        }
    }

    /// Persist subscriptions in PostgreSQL through the given pool.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Replace the validator applied on create and update.
    #[must_use]
    pub fn with_validator(mut self, validator: DefaultSubscriptionValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Whether subscriptions are persisted in PostgreSQL.
    #[must_use]
    pub const fn uses_database(&self) -> bool {
        self.db_pool.is_some()
    }
}
