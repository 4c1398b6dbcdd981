use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    routing::get,
};
use std::sync::Arc;

use crate::api::AppState;
use crate::middleware::auth::CurrentUser;
use crate::models::server::{FilterRequest, ServerListParams, ShapedServer};
use crate::services::server_list::list_servers;
use crate::utils::error::{AppResult, ErrorResponse};

pub const SERVER_TAG: &str = "server";

/// List servers, optionally filtered.
///
/// Filters apply in a fixed order: category, membership of the caller,
/// member count annotation, `qty` truncation (by ascending id), then the
/// `by_serverid` lookup.
#[utoipa::path(
    get,
    path = "/api/servers/select/",
    tag = SERVER_TAG,
    params(ServerListParams),
    responses(
        (status = 200, description = "Servers matching the filters", body = [ShapedServer]),
        (status = 400, description = "Malformed qty or by_serverid", body = ErrorResponse),
        (status = 401, description = "by_user or by_serverid without valid credentials", body = ErrorResponse),
        (status = 404, description = "No server with the requested id", body = ErrorResponse)
    ),
    security((), ("bearer" = []))
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<CurrentUser>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Json<Vec<ShapedServer>>> {
    let request = FilterRequest::from(pairs.into_iter().collect::<ServerListParams>());
    let user = user.map(|Extension(user)| user);
    let servers = list_servers(&state.db, &request, user.as_ref()).await?;
    Ok(Json(servers))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/servers/", get(list))
        .route("/servers/select/", get(list))
        .with_state(state)
}
