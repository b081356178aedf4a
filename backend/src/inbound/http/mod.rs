//! HTTP inbound adapter exposing the subscription REST endpoints.

pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
pub mod subscriptions;
pub mod validation;

pub use error::ApiResult;
