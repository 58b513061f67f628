use std::collections::BTreeSet;

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use super::models::{Role, User};

const USER_COLUMNS: &str = "id,email,password_hash,email_confirmed,created_at";

pub async fn find_by_id(db: impl SqliteExecutor<'_>, user_id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id=?"))
        .bind(user_id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_email(db: impl SqliteExecutor<'_>, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email=? COLLATE NOCASE"))
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn insert(db: impl SqliteExecutor<'_>, email: &str, password_hash: &str) -> sqlx::Result<User> {
    let user = User {
        id: Uuid::now_v7(),
        email: email.to_owned(),
        password_hash: password_hash.to_owned(),
        email_confirmed: false,
        created_at: Utc::now(),
    };
    sqlx::query("INSERT INTO users (id,email,password_hash,email_confirmed,created_at) VALUES (?,?,?,?,?)")
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.email_confirmed)
        .bind(user.created_at)
        .execute(db)
        .await?;
    Ok(user)
}

pub async fn list(db: impl SqliteExecutor<'_>) -> sqlx::Result<Vec<User>> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY email"))
        .fetch_all(db)
        .await
}

pub async fn roles(db: impl SqliteExecutor<'_>, user_id: Uuid) -> sqlx::Result<BTreeSet<Role>> {
    let rows: Vec<(Role,)> = sqlx::query_as("SELECT role FROM user_roles WHERE user_id=?")
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(|(role,)| role).collect())
}

/// Idempotent.
pub async fn add_role(db: impl SqliteExecutor<'_>, user_id: Uuid, role: Role) -> sqlx::Result<()> {
    sqlx::query("INSERT OR IGNORE INTO user_roles (user_id,role) VALUES (?,?)")
        .bind(user_id)
        .bind(role)
        .execute(db)
        .await?;
    Ok(())
}

/// Idempotent.
pub async fn remove_role(db: impl SqliteExecutor<'_>, user_id: Uuid, role: Role) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM user_roles WHERE user_id=? AND role=?")
        .bind(user_id)
        .bind(role)
        .execute(db)
        .await?;
    Ok(())
}

/// Replaces the whole role set in one transaction.
pub async fn set_roles(db_pool: &SqlitePool, user_id: Uuid, roles: &BTreeSet<Role>) -> sqlx::Result<()> {
    let mut tx = db_pool.begin().await?;
    sqlx::query("DELETE FROM user_roles WHERE user_id=?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    for role in roles {
        add_role(&mut *tx, user_id, *role).await?;
    }
    tx.commit().await
}
