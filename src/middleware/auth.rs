use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use sqlx::FromRow;
use std::sync::Arc;

use crate::api::AppState;
use crate::utils::error::{AppError, AppResult};

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Resolves a bearer token to the user it was issued for.
pub async fn authenticate(state: &AppState, token: &str) -> AppResult<CurrentUser> {
    let claims = state.jwt_service.verify_token(token)?;
    let user_id = claims.user_id()?;

    // Tokens outlive accounts; make sure the user is still there.
    sqlx::query_as::<_, CurrentUser>("SELECT id, username FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::Unauthenticated("User no longer exists".to_string()))
}

/// Attaches a [`CurrentUser`] extension when the request carries a valid
/// bearer token. Requests without one pass through anonymously; a bearer
/// token that fails verification is rejected.
pub async fn optional_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request.headers().typed_get::<Authorization<Bearer>>();

    if let Some(Authorization(bearer)) = bearer {
        let user = authenticate(&state, bearer.token()).await?;
        tracing::debug!("Authenticated request as user {}", user.id);
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}
