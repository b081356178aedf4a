//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{SubscriptionCommand, SubscriptionQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub subscriptions: Arc<dyn SubscriptionQuery>,
    pub subscription_commands: Arc<dyn SubscriptionCommand>,
}

impl HttpState {
    /// Construct state from the read and write ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use calendar_backend::domain::SubscriptionService;
    /// use calendar_backend::inbound::http::state::HttpState;
    /// use calendar_backend::outbound::memory::InMemorySubscriptionRepository;
    ///
    /// let service = Arc::new(SubscriptionService::new(Arc::new(
    ///     InMemorySubscriptionRepository::default(),
    /// )));
    /// let state = HttpState::new(service.clone(), service);
    /// let _reads = state.subscriptions.clone();
    /// ```
    #[must_use]
    pub fn new(
        subscriptions: Arc<dyn SubscriptionQuery>,
        subscription_commands: Arc<dyn SubscriptionCommand>,
    ) -> Self {
        Self {
            subscriptions,
            subscription_commands,
        }
    }
}
