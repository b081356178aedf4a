//! bb8 pool of `diesel-async` PostgreSQL connections.
//!
//! The pool is cheap to clone and shared by every repository instance.
//! Checkout failures become [`PoolError::Checkout`]; the subscription
//! repository reports those as connection errors.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Pool construction or checkout failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// bb8 rejected the pool configuration.
    #[error("could not build PostgreSQL pool: {0}")]
    Build(String),
    /// No connection became free within the checkout timeout.
    #[error("no PostgreSQL connection available: {0}")]
    Checkout(String),
}

impl PoolError {
    /// A [`PoolError::Build`] carrying `reason`.
    pub fn build(reason: impl Into<String>) -> Self {
        Self::Build(reason.into())
    }

    /// A [`PoolError::Checkout`] carrying `reason`.
    pub fn checkout(reason: impl Into<String>) -> Self {
        Self::Checkout(reason.into())
    }
}

/// Sizing and timeouts for [`DbPool`].
///
/// ```
/// use std::time::Duration;
/// use calendar_backend::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://calendar@localhost/calendar")
///     .with_max_size(4)
///     .with_checkout_timeout(Duration::from_secs(5));
/// assert_eq!(config.max_size(), 4);
/// assert_eq!(config.checkout_timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Connection cap used unless overridden.
    pub const DEFAULT_MAX_SIZE: u32 = 10;
    /// Checkout wait used unless overridden.
    pub const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Defaults for `database_url`.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: Self::DEFAULT_MAX_SIZE,
            checkout_timeout: Self::DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Cap the number of open connections. Zero is raised to one.
    #[must_use]
    pub fn with_max_size(self, max_size: u32) -> Self {
        Self {
            max_size: max_size.max(1),
            ..self
        }
    }

    /// How long a repository call waits for a free connection.
    #[must_use]
    pub fn with_checkout_timeout(self, checkout_timeout: Duration) -> Self {
        Self {
            checkout_timeout,
            ..self
        }
    }

    /// Connection string the pool dials.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Connection cap.
    #[must_use]
    pub const fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Checkout wait.
    #[must_use]
    pub const fn checkout_timeout(&self) -> Duration {
        self.checkout_timeout
    }
}

/// Shared PostgreSQL connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool. Connections are opened lazily by bb8.
    ///
    /// # Errors
    ///
    /// [`PoolError::Build`] when bb8 rejects the configuration.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let PoolConfig {
            database_url,
            max_size,
            checkout_timeout,
        } = config;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        Pool::builder()
            .max_size(max_size)
            .connection_timeout(checkout_timeout)
            .build(manager)
            .await
            .map(|inner| Self { inner })
            .map_err(|err| PoolError::build(err.to_string()))
    }

    /// Borrow a connection for the duration of one repository call.
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] when none frees up within the checkout timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn new_config_uses_defaults() {
        let config = PoolConfig::new("postgres://localhost/calendar");

        assert_eq!(config.database_url(), "postgres://localhost/calendar");
        assert_eq!(config.max_size(), PoolConfig::DEFAULT_MAX_SIZE);
        assert_eq!(config.checkout_timeout(), PoolConfig::DEFAULT_CHECKOUT_TIMEOUT);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(25, 25)]
    fn max_size_is_at_least_one(#[case] requested: u32, #[case] expected: u32) {
        let config = PoolConfig::new("postgres://localhost/calendar").with_max_size(requested);
        assert_eq!(config.max_size(), expected);
    }

    #[rstest]
    fn checkout_errors_name_the_cause() {
        let error = PoolError::checkout("connection refused");
        assert_eq!(
            error.to_string(),
            "no PostgreSQL connection available: connection refused"
        );
    }
}
