//! Per-request correlation identifier.
//!
//! The middleware installs a [`TraceId`] in task-local storage for the whole
//! request, and `Error` constructors read it back so every error payload
//! names the request that produced it. Spawned tasks do not inherit the
//! value; run them through [`TraceId::scope`] as well.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use uuid::Uuid;

/// Response header carrying the trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

tokio::task_local! {
    static CURRENT: TraceId;
}

/// UUID identifying one request across logs, headers and error bodies.
///
/// ```
/// use calendar_backend::domain::TraceId;
///
/// let id: TraceId = "6f1c2a44-8c53-4f7e-9a0b-3d2e1f0c9b8a".parse().unwrap();
/// assert_eq!(id.to_string(), "6f1c2a44-8c53-4f7e-9a0b-3d2e1f0c9b8a");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random (v4) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier of the request being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `self` as the current identifier.
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT.scope(self, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw).map(Self)
    }
}
