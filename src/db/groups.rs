use sqlx::SqliteExecutor;
use uuid::Uuid;

use super::models::{Group, Profile};

pub async fn insert(db: impl SqliteExecutor<'_>, name: &str) -> sqlx::Result<Group> {
    let group = Group {
        id: Uuid::now_v7(),
        name: name.to_owned(),
    };
    sqlx::query("INSERT INTO social_groups (id,name) VALUES (?,?)")
        .bind(group.id)
        .bind(&group.name)
        .execute(db)
        .await?;
    Ok(group)
}

pub async fn find(db: impl SqliteExecutor<'_>, group_id: Uuid) -> sqlx::Result<Option<Group>> {
    sqlx::query_as("SELECT id,name FROM social_groups WHERE id=?")
        .bind(group_id)
        .fetch_optional(db)
        .await
}

pub async fn list(db: impl SqliteExecutor<'_>) -> sqlx::Result<Vec<Group>> {
    sqlx::query_as("SELECT id,name FROM social_groups ORDER BY name, id")
        .fetch_all(db)
        .await
}

pub async fn members(db: impl SqliteExecutor<'_>, group_id: Uuid) -> sqlx::Result<Vec<Profile>> {
    sqlx::query_as(
        "SELECT p.id,p.user_id,p.name,p.visibility FROM profiles p
         JOIN group_members m ON m.profile_id = p.id
         WHERE m.group_id=? ORDER BY p.name",
    )
    .bind(group_id)
    .fetch_all(db)
    .await
}

/// Membership is checked by user, since messages are sent by users.
pub async fn is_member(db: impl SqliteExecutor<'_>, group_id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM group_members m JOIN profiles p ON p.id = m.profile_id
         WHERE m.group_id=? AND p.user_id=?",
    )
    .bind(group_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row.is_some())
}

/// Idempotent; returns whether the profile was newly added.
pub async fn join(db: impl SqliteExecutor<'_>, group_id: Uuid, profile_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("INSERT OR IGNORE INTO group_members (group_id,profile_id) VALUES (?,?)")
        .bind(group_id)
        .bind(profile_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Idempotent; returns whether the profile was a member.
pub async fn leave(db: impl SqliteExecutor<'_>, group_id: Uuid, profile_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM group_members WHERE group_id=? AND profile_id=?")
        .bind(group_id)
        .bind(profile_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() == 1)
}
