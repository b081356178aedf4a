//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `CALENDAR_*` environment variables, configuration files
//! and command-line flags, layered by OrthoConfig.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use calendar_backend::domain::{
    DefaultSubscriptionValidator, SubscriptionType, SubscriptionTypeValidationError,
};
use calendar_backend::outbound::persistence::PoolConfig;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Settings rejected after loading.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// `host` is not an IP address.
    #[error("invalid listen host {host:?}: {message}")]
    InvalidHost { host: String, message: String },
    /// An `allowed_types` entry is not a valid subscription type.
    #[error("invalid allowed subscription type {value:?}: {source}")]
    InvalidAllowedType {
        value: String,
        source: SubscriptionTypeValidationError,
    },
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CALENDAR")]
pub struct ServerSettings {
    /// IP address to listen on.
    pub host: Option<String>,
    /// TCP port to listen on.
    pub port: Option<u16>,
    /// PostgreSQL connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Seconds a request waits for a pooled connection.
    pub pool_timeout_secs: Option<u64>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Comma-separated allow-list of subscription types.
    pub allowed_types: Option<String>,
}

impl ServerSettings {
    /// Socket address assembled from `host` and `port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let ip: IpAddr = host.parse().map_err(|err: std::net::AddrParseError| {
            SettingsError::InvalidHost {
                host: host.to_owned(),
                message: err.to_string(),
            }
        })?;
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Pool configuration when a database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?;
        let mut config = PoolConfig::new(url);
        if let Some(max_size) = self.pool_max_size {
            config = config.with_max_size(max_size);
        }
        if let Some(secs) = self.pool_timeout_secs {
            config = config.with_checkout_timeout(Duration::from_secs(secs));
        }
        Some(config)
    }

    /// Validator honouring the configured type allow-list.
    pub fn validator(&self) -> Result<DefaultSubscriptionValidator, SettingsError> {
        let Some(raw) = self.allowed_types.as_deref() else {
            return Ok(DefaultSubscriptionValidator::default());
        };
        let types = raw
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                SubscriptionType::new(value).map_err(|source| SettingsError::InvalidAllowedType {
                    value: value.to_owned(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DefaultSubscriptionValidator::with_allowed_types(types))
    }
}
