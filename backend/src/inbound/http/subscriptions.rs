//! Subscription HTTP handlers.
//!
//! ```text
//! GET    /api/v1/users/{user_id}/subscriptions?type=&limit=&offset=
//! GET    /api/v1/users/{user_id}/subscriptions/count?type=
//! GET    /api/v1/users/{user_id}/subscriptions/{id}?type=
//! GET    /api/v1/users/{user_id}/subscriptions/{id}/exists?type=
//! POST   /api/v1/users/{user_id}/subscriptions
//! PUT    /api/v1/users/{user_id}/subscriptions/{id}
//! DELETE /api/v1/users/{user_id}/subscriptions/{id}
//! ```
//!
//! Every lookup is scoped to the user in the path, so a subscription owned by
//! someone else answers 404 exactly like a missing one.

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Subscription, SubscriptionId, SubscriptionType, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::{json_config, path_config, query_config};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    id_mismatch_error, parse_optional_subscription_type, parse_subscription_id,
    parse_subscription_type, parse_user_id,
};

#[derive(Debug, Deserialize)]
struct UserPath {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct SubscriptionPath {
    user_id: String,
    id: i64,
}

/// Optional type filter shared by the lookup endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TypeFilter {
    /// Restrict the lookup to one subscription type.
    #[serde(rename = "type")]
    pub subscription_type: Option<String>,
}

/// Type filter plus pagination for listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Restrict the listing to one subscription type.
    #[serde(rename = "type")]
    pub subscription_type: Option<String>,
    /// Maximum number of rows to return; omitted means unbounded.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: Option<u32>,
}

/// Request body for creating or replacing a subscription.
///
/// Example JSON:
/// `{"subscriptionType":"webcal","url":"webcal://example.org/holidays.ics"}`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    /// Identifier echoed on replace; must match the path when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Lowercase type slug.
    #[schema(example = "webcal")]
    pub subscription_type: String,
    /// Source calendar URL; `http`, `https`, `webcal` or `webcals`.
    #[schema(example = "webcal://example.org/holidays.ics")]
    pub url: String,
}

/// Persisted subscription as returned to clients.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    /// Storage-assigned identifier.
    pub id: i64,
    /// Owner identifier from the path.
    pub user_id: String,
    /// Kind of feed.
    #[schema(example = "webcal")]
    pub subscription_type: String,
    /// Source calendar URL.
    pub url: String,
    /// RFC 3339 creation timestamp.
    pub created_at: Option<String>,
}

impl TryFrom<Subscription> for SubscriptionResponse {
    type Error = Error;

    fn try_from(value: Subscription) -> Result<Self, Self::Error> {
        let id = value
            .id
            .ok_or_else(|| Error::internal("persisted subscription has no id"))?;
        Ok(Self {
            id: id.get(),
            user_id: value.user_id.to_string(),
            subscription_type: value.subscription_type.as_str().to_owned(),
            url: value.url,
            created_at: value.created_at.map(|at| at.to_rfc3339()),
        })
    }
}

/// Number of matching subscriptions.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CountResponse {
    /// Matching subscriptions.
    pub count: u64,
}

/// Whether a matching subscription exists.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ExistsResponse {
    /// `true` when at least one subscription matches.
    pub exists: bool,
}

fn parse_user_path(path: UserPath) -> Result<UserId, Error> {
    parse_user_id(&path.user_id)
}

fn parse_subscription_path(path: SubscriptionPath) -> Result<(UserId, SubscriptionId), Error> {
    Ok((parse_user_id(&path.user_id)?, parse_subscription_id(path.id)?))
}

struct ParsedBody {
    subscription_type: SubscriptionType,
    url: String,
}

fn parse_body(
    payload: SubscriptionRequest,
    path_id: Option<SubscriptionId>,
) -> Result<ParsedBody, Error> {
    if let (Some(expected), Some(raw)) = (path_id, payload.id) {
        let body_id = parse_subscription_id(raw)?;
        if body_id != expected {
            return Err(id_mismatch_error(expected, body_id));
        }
    }
    Ok(ParsedBody {
        subscription_type: parse_subscription_type(&payload.subscription_type)?,
        url: payload.url,
    })
}

fn to_responses(subscriptions: Vec<Subscription>) -> ApiResult<Vec<SubscriptionResponse>> {
    subscriptions
        .into_iter()
        .map(SubscriptionResponse::try_from)
        .collect()
}

/// List a user's subscriptions.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/subscriptions",
    params(
        ("user_id" = String, Path, description = "Owner identifier"),
        ListParams
    ),
    responses(
        (status = 200, description = "Subscriptions ordered by id", body = [SubscriptionResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "listSubscriptions"
)]
#[get("/users/{user_id}/subscriptions")]
pub async fn list_subscriptions(
    state: web::Data<HttpState>,
    path: web::Path<UserPath>,
    params: web::Query<ListParams>,
) -> ApiResult<web::Json<Vec<SubscriptionResponse>>> {
    let user_id = parse_user_path(path.into_inner())?;
    let ListParams {
        subscription_type,
        limit,
        offset,
    } = params.into_inner();
    let found = match parse_optional_subscription_type(subscription_type.as_deref())? {
        Some(kind) => {
            state
                .subscriptions
                .find_all_by_type(&user_id, &kind, limit, offset)
                .await?
        }
        None => state.subscriptions.find_all(&user_id, limit, offset).await?,
    };
    Ok(web::Json(to_responses(found)?))
}

/// Count a user's subscriptions.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/subscriptions/count",
    params(
        ("user_id" = String, Path, description = "Owner identifier"),
        TypeFilter
    ),
    responses(
        (status = 200, description = "Subscription count", body = CountResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "countSubscriptions"
)]
#[get("/users/{user_id}/subscriptions/count")]
pub async fn count_subscriptions(
    state: web::Data<HttpState>,
    path: web::Path<UserPath>,
    filter: web::Query<TypeFilter>,
) -> ApiResult<web::Json<CountResponse>> {
    let user_id = parse_user_path(path.into_inner())?;
    let count = match parse_optional_subscription_type(filter.subscription_type.as_deref())? {
        Some(kind) => {
            state
                .subscriptions
                .count_by_type(&kind, Some(user_id))
                .await?
        }
        None => state.subscriptions.count(Some(user_id)).await?,
    };
    Ok(web::Json(CountResponse { count }))
}

/// Fetch one subscription.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/subscriptions/{id}",
    params(
        ("user_id" = String, Path, description = "Owner identifier"),
        ("id" = i64, Path, description = "Subscription identifier"),
        TypeFilter
    ),
    responses(
        (status = 200, description = "Subscription", body = SubscriptionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Ambiguous match or internal error", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "getSubscription"
)]
#[get("/users/{user_id}/subscriptions/{id}")]
pub async fn get_subscription(
    state: web::Data<HttpState>,
    path: web::Path<SubscriptionPath>,
    filter: web::Query<TypeFilter>,
) -> ApiResult<web::Json<SubscriptionResponse>> {
    let (user_id, id) = parse_subscription_path(path.into_inner())?;
    let found = match parse_optional_subscription_type(filter.subscription_type.as_deref())? {
        Some(kind) => {
            state
                .subscriptions
                .find_by_type(id, &kind, Some(user_id))
                .await?
        }
        None => state.subscriptions.find(id, Some(user_id)).await?,
    };
    Ok(web::Json(SubscriptionResponse::try_from(found)?))
}

/// Report whether a subscription exists.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/subscriptions/{id}/exists",
    params(
        ("user_id" = String, Path, description = "Owner identifier"),
        ("id" = i64, Path, description = "Subscription identifier"),
        TypeFilter
    ),
    responses(
        (status = 200, description = "Existence flag", body = ExistsResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "subscriptionExists"
)]
#[get("/users/{user_id}/subscriptions/{id}/exists")]
pub async fn subscription_exists(
    state: web::Data<HttpState>,
    path: web::Path<SubscriptionPath>,
    filter: web::Query<TypeFilter>,
) -> ApiResult<web::Json<ExistsResponse>> {
    let (user_id, id) = parse_subscription_path(path.into_inner())?;
    let exists = match parse_optional_subscription_type(filter.subscription_type.as_deref())? {
        Some(kind) => {
            state
                .subscriptions
                .does_exist_of_type(id, &kind, Some(user_id))
                .await?
        }
        None => state.subscriptions.does_exist(id, Some(user_id)).await?,
    };
    Ok(web::Json(ExistsResponse { exists }))
}

/// Create a subscription for the user.
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/subscriptions",
    request_body = SubscriptionRequest,
    params(("user_id" = String, Path, description = "Owner identifier")),
    responses(
        (status = 201, description = "Created", body = SubscriptionResponse,
            headers(("Location" = String, description = "URI of the new subscription"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "createSubscription"
)]
#[post("/users/{user_id}/subscriptions")]
pub async fn create_subscription(
    state: web::Data<HttpState>,
    path: web::Path<UserPath>,
    payload: web::Json<SubscriptionRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_user_path(path.into_inner())?;
    let body = parse_body(payload.into_inner(), None)?;
    let created = state
        .subscription_commands
        .create(Subscription::new(user_id, body.subscription_type, body.url))
        .await?;
    let response = SubscriptionResponse::try_from(created)?;
    let location = format!(
        "/api/v1/users/{}/subscriptions/{}",
        response.user_id, response.id
    );
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location))
        .json(response))
}

/// Replace a subscription's type and URL.
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/subscriptions/{id}",
    request_body = SubscriptionRequest,
    params(
        ("user_id" = String, Path, description = "Owner identifier"),
        ("id" = i64, Path, description = "Subscription identifier")
    ),
    responses(
        (status = 200, description = "Updated subscription", body = SubscriptionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "updateSubscription"
)]
#[put("/users/{user_id}/subscriptions/{id}")]
pub async fn update_subscription(
    state: web::Data<HttpState>,
    path: web::Path<SubscriptionPath>,
    payload: web::Json<SubscriptionRequest>,
) -> ApiResult<web::Json<SubscriptionResponse>> {
    let (user_id, id) = parse_subscription_path(path.into_inner())?;
    let body = parse_body(payload.into_inner(), Some(id))?;
    let existing = state.subscriptions.find(id, Some(user_id.clone())).await?;

    let mut replacement = Subscription::new(user_id, body.subscription_type, body.url).with_id(id);
    replacement.created_at = existing.created_at;
    let updated = state.subscription_commands.update(replacement).await?;
    Ok(web::Json(SubscriptionResponse::try_from(updated)?))
}

/// Delete a subscription.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/subscriptions/{id}",
    params(
        ("user_id" = String, Path, description = "Owner identifier"),
        ("id" = i64, Path, description = "Subscription identifier")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "deleteSubscription"
)]
#[delete("/users/{user_id}/subscriptions/{id}")]
pub async fn delete_subscription(
    state: web::Data<HttpState>,
    path: web::Path<SubscriptionPath>,
) -> ApiResult<HttpResponse> {
    let (user_id, id) = parse_subscription_path(path.into_inner())?;
    let existing = state.subscriptions.find(id, Some(user_id)).await?;
    state.subscription_commands.delete(existing).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the subscription handlers on a scope or app.
///
/// `count` is registered ahead of the `{id}` routes so the literal segment
/// wins.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use calendar_backend::inbound::http::subscriptions;
///
/// let app = App::new().service(web::scope("/api/v1").configure(subscriptions::configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(count_subscriptions)
        .service(list_subscriptions)
        .service(create_subscription)
        .service(subscription_exists)
        .service(get_subscription)
        .service(update_subscription)
        .service(delete_subscription);
}

#[cfg(test)]
#[path = "subscriptions_tests.rs"]
mod tests;
