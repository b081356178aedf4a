//! Calendar subscription backend.
//!
//! The [`domain`] module holds the subscription entity and the service façade
//! over the repository port; [`inbound`] and [`outbound`] hold the HTTP and
//! persistence adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
