use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::DbPool;
use crate::models::user::{User, UserResponse};
use crate::utils::crypto::verify_password;
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt::JwtService;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthenticated("Invalid username or password".to_string())
}

pub async fn login_user(
    pool: &DbPool,
    request: LoginRequest,
    jwt_service: &JwtService,
) -> AppResult<LoginResponse> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(&request.username)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&request.password, &user.password_hash)? {
        tracing::debug!("Rejected login for {}", user.username);
        return Err(invalid_credentials());
    }

    let token = jwt_service.generate_token(user.id, &user.username)?;
    tracing::info!("User {} logged in", user.username);

    Ok(LoginResponse {
        user: user.into(),
        token,
    })
}
