use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use std::sync::Arc;

pub type DbPool = Arc<Pool<Sqlite>>;

pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    run_migrations(&pool).await?;
    Ok(Arc::new(pool))
}

/// A migrated, private in-memory database.
///
/// Each SQLite in-memory connection is its own database, so the pool is
/// pinned to a single connection that never expires.
pub async fn create_memory_pool() -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    run_migrations(&pool).await?;
    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &Pool<Sqlite>) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
