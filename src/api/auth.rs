use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use std::sync::Arc;

use crate::database::DbPool;
use crate::services::auth::{LoginRequest, LoginResponse, login_user};
use crate::utils::error::{AppResult, ErrorResponse};
use crate::utils::jwt::JwtService;

pub const AUTH_TAG: &str = "auth";

pub struct AppState {
    pub db: DbPool,
    pub jwt_service: Arc<JwtService>,
}

async fn health_check() -> &'static str {
    "OK"
}

/// Exchange a username and password for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Unknown user or wrong password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = login_user(&state.db, payload, &state.jwt_service).await?;
    Ok(Json(response))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/login", post(login))
        .with_state(state)
}
