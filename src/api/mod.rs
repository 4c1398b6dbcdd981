pub mod auth;
pub mod servers;

use axum::{Json, Router, routing::get};
use std::sync::Arc;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

pub use auth::AppState;

use crate::models::{
    channel::Channel,
    server::{ServerDetail, ShapedServer},
    user::UserResponse,
};
use crate::services::auth::{LoginRequest, LoginResponse};
use crate::utils::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(servers::list, auth::login),
    components(schemas(
        ShapedServer,
        ServerDetail,
        Channel,
        LoginRequest,
        LoginResponse,
        UserResponse,
        ErrorResponse
    )),
    modifiers(&BearerSecurity),
    tags(
        (name = "server", description = "Server directory"),
        (name = "auth", description = "Token issuance")
    )
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

async fn schema() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn routes(state: Arc<AppState>) -> Router {
    let server_routes = servers::routes(state.clone()).layer(
        axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::optional_auth_middleware,
        ),
    );

    Router::new()
        .nest("/auth", auth::routes(state))
        .route("/schema/", get(schema))
        .merge(server_routes)
}
