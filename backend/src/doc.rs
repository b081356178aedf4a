//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the subscription and health endpoints together with
//! the error schema wrappers from the inbound layer, so domain types stay free
//! of utoipa derives. Swagger UI serves it in debug builds.

use utoipa::OpenApi;

use crate::inbound::http::health::ProbeResponse;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::subscriptions::{
    CountResponse, ExistsResponse, SubscriptionRequest, SubscriptionResponse,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Calendar subscriptions API",
        description = "Create, inspect and remove calendar subscriptions per user."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::subscriptions::list_subscriptions,
        crate::inbound::http::subscriptions::count_subscriptions,
        crate::inbound::http::subscriptions::get_subscription,
        crate::inbound::http::subscriptions::subscription_exists,
        crate::inbound::http::subscriptions::create_subscription,
        crate::inbound::http::subscriptions::update_subscription,
        crate::inbound::http::subscriptions::delete_subscription,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        SubscriptionRequest,
        SubscriptionResponse,
        CountResponse,
        ExistsResponse,
        ProbeResponse
    )),
    tags(
        (name = "subscriptions", description = "Calendar subscriptions owned by a user"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
