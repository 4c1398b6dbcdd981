use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A channel as nested under its server in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub topic: Option<String>,
    pub owner: i64,
    pub server: i64,
}
