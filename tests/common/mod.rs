#![allow(dead_code)]

use server_directory::api::AppState;
use server_directory::database::{DbPool, create_memory_pool};
use server_directory::utils::jwt::JwtService;
use std::sync::Arc;

pub const TEST_SECRET: &str = "test-secret";

pub const GAMING: i64 = 1;
pub const MUSIC: i64 = 2;

pub const ALICE: i64 = 7;
pub const BOB: i64 = 8;

/// Fresh application state over an empty, migrated in-memory database.
pub async fn setup() -> Arc<AppState> {
    let db = create_memory_pool().await.unwrap();
    Arc::new(AppState {
        db,
        jwt_service: Arc::new(JwtService::new(TEST_SECRET, chrono::Duration::hours(1))),
    })
}

pub async fn insert_user(pool: &DbPool, id: i64, username: &str, password_hash: &str) {
    sqlx::query("INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(pool.as_ref())
        .await
        .unwrap();
}

pub async fn insert_category(pool: &DbPool, id: i64, name: &str) {
    sqlx::query("INSERT INTO categories (id, name) VALUES (?, ?)")
        .bind(id)
        .bind(name)
        .execute(pool.as_ref())
        .await
        .unwrap();
}

pub async fn insert_server(pool: &DbPool, id: i64, name: &str, category_id: i64, owner_id: i64) {
    sqlx::query(
        "INSERT INTO servers (id, name, description, owner_id, category_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(name)
    .bind(format!("{} server", name))
    .bind(owner_id)
    .bind(category_id)
    .execute(pool.as_ref())
    .await
    .unwrap();
}

pub async fn add_member(pool: &DbPool, server_id: i64, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO server_members (server_id, user_id, joined_at) VALUES (?, ?, ?)")
        .bind(server_id)
        .bind(user_id)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(pool.as_ref())
        .await?;
    Ok(())
}

pub async fn insert_channel(pool: &DbPool, id: i64, name: &str, server_id: i64, owner_id: i64) {
    sqlx::query(
        "INSERT INTO channels (id, name, topic, owner_id, server_id) VALUES (?, ?, NULL, ?, ?)",
    )
    .bind(id)
    .bind(name)
    .bind(owner_id)
    .bind(server_id)
    .execute(pool.as_ref())
    .await
    .unwrap();
}

/// Three servers:
/// - 1 "Arena", gaming, members {alice}, channels general + clips
/// - 2 "Jam", music, members {alice, bob}, channel lobby
/// - 3 "Speedrun", gaming, members {bob}, no channels
pub async fn seed(pool: &DbPool) {
    insert_user(pool, ALICE, "alice", "!").await;
    insert_user(pool, BOB, "bob", "!").await;

    insert_category(pool, GAMING, "gaming").await;
    insert_category(pool, MUSIC, "music").await;

    insert_server(pool, 1, "Arena", GAMING, ALICE).await;
    insert_server(pool, 2, "Jam", MUSIC, ALICE).await;
    insert_server(pool, 3, "Speedrun", GAMING, BOB).await;

    add_member(pool, 1, ALICE).await.unwrap();
    add_member(pool, 2, ALICE).await.unwrap();
    add_member(pool, 2, BOB).await.unwrap();
    add_member(pool, 3, BOB).await.unwrap();

    insert_channel(pool, 1, "general", 1, ALICE).await;
    insert_channel(pool, 2, "clips", 1, ALICE).await;
    insert_channel(pool, 3, "lobby", 2, ALICE).await;
}

pub async fn seeded() -> Arc<AppState> {
    let state = setup().await;
    seed(&state.db).await;
    state
}
