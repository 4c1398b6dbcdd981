use axum::{Router, http::Method};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::AppState;
use crate::config::Config;
use crate::database;
use crate::utils::jwt::JwtService;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .nest("/api", crate::api::routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn register_routes(config: &Config) -> anyhow::Result<Router> {
    let db = database::create_pool(&config.database_url).await?;
    tracing::info!("Database connected and migrations applied");

    let jwt_service = Arc::new(JwtService::new(&config.secret_key, config.token_ttl));

    let state = Arc::new(AppState { db, jwt_service });

    Ok(build_router(state))
}
