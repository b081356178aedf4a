//! Server construction and middleware wiring.

mod config;
mod settings;

pub use config::ServerConfig;
pub use settings::{ServerSettings, SettingsError};

use std::future::Future;
use std::sync::Arc;

use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use calendar_backend::Trace;
#[cfg(debug_assertions)]
use calendar_backend::doc::ApiDoc;
use calendar_backend::domain::SubscriptionService;
use calendar_backend::inbound::http::health::{HealthState, live, ready};
use calendar_backend::inbound::http::state::HttpState;
use calendar_backend::inbound::http::subscriptions;
use calendar_backend::outbound::memory::InMemorySubscriptionRepository;
use calendar_backend::outbound::persistence::DieselSubscriptionRepository;

/// Wire the subscription service to the configured repository adapter.
fn build_http_state(config: &ServerConfig) -> HttpState {
    let validator = Arc::new(config.validator.clone());
    match &config.db_pool {
        Some(pool) => {
            let repository = Arc::new(DieselSubscriptionRepository::new(pool.clone()));
            let service = Arc::new(SubscriptionService::with_validator(repository, validator));
            HttpState::new(service.clone(), service)
        }
        None => {
            let repository = Arc::new(InMemorySubscriptionRepository::default());
            let service = Arc::new(SubscriptionService::with_validator(repository, validator));
            HttpState::new(service.clone(), service)
        }
    }
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(subscriptions::configure))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// The health state is marked ready once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config));
    let server_health_state = health_state.clone();
    info!(
        bind_addr = %config.bind_addr,
        database = config.uses_database(),
        "starting calendar subscription server"
    );

    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .disable_signals()
        .bind(config.bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}

/// Wait for `shutdown`, report the process as not live, then stop the server
/// gracefully so in-flight requests finish while probes already fail.
pub async fn drain_on_shutdown(
    health_state: web::Data<HealthState>,
    handle: ServerHandle,
    shutdown: impl Future<Output = ()>,
) {
    shutdown.await;
    health_state.mark_unhealthy();
    info!("shutdown requested; draining in-flight requests");
    handle.stop(true).await;
}
