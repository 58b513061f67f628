//! SQLite persistence. Every query the handlers need lives in one of the
//! per-entity modules below and returns fully materialized rows.

pub mod comments;
pub mod content;
pub mod friendships;
pub mod groups;
pub mod messages;
pub mod models;
pub mod profiles;
pub mod users;

use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

/// Connects to `url` and applies the embedded migrations.
pub async fn init_pool(url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(options)
        .await?;

    migrate(&db_pool).await?;
    tracing::info!(url, "database ready");
    Ok(db_pool)
}

/// A private in-memory database. Capped at one connection because every
/// `:memory:` connection is its own database.
pub async fn in_memory() -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&db_pool).await?;
    Ok(db_pool)
}

pub async fn migrate(db_pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(db_pool).await
}
