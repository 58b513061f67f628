use chrono::Utc;
use sqlx::SqliteExecutor;
use uuid::Uuid;

use super::models::{Friendship, FriendshipStatus};

const FRIENDSHIP_COLUMNS: &str = "id,sender_id,receiver_id,status,created_at";

pub async fn find(db: impl SqliteExecutor<'_>, friendship_id: Uuid) -> sqlx::Result<Option<Friendship>> {
    sqlx::query_as(&format!("SELECT {FRIENDSHIP_COLUMNS} FROM friendships WHERE id=?"))
        .bind(friendship_id)
        .fetch_optional(db)
        .await
}

/// The friendship between two users, whichever of them sent it.
pub async fn between(db: impl SqliteExecutor<'_>, a: Uuid, b: Uuid) -> sqlx::Result<Option<Friendship>> {
    sqlx::query_as(&format!(
        "SELECT {FRIENDSHIP_COLUMNS} FROM friendships
         WHERE (sender_id=? AND receiver_id=?) OR (sender_id=? AND receiver_id=?)"
    ))
    .bind(a)
    .bind(b)
    .bind(b)
    .bind(a)
    .fetch_optional(db)
    .await
}

pub async fn are_friends(db: impl SqliteExecutor<'_>, a: Uuid, b: Uuid) -> sqlx::Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM friendships
         WHERE status='Accepted' AND ((sender_id=? AND receiver_id=?) OR (sender_id=? AND receiver_id=?))",
    )
    .bind(a)
    .bind(b)
    .bind(b)
    .bind(a)
    .fetch_optional(db)
    .await?;
    Ok(row.is_some())
}

pub async fn insert_pending(db: impl SqliteExecutor<'_>, sender_id: Uuid, receiver_id: Uuid) -> sqlx::Result<Friendship> {
    let friendship = Friendship {
        id: Uuid::now_v7(),
        sender_id,
        receiver_id,
        status: FriendshipStatus::Pending,
        created_at: Utc::now(),
    };
    sqlx::query("INSERT INTO friendships (id,sender_id,receiver_id,status,created_at) VALUES (?,?,?,?,?)")
        .bind(friendship.id)
        .bind(friendship.sender_id)
        .bind(friendship.receiver_id)
        .bind(friendship.status)
        .bind(friendship.created_at)
        .execute(db)
        .await?;
    Ok(friendship)
}

/// Moves a `Pending` friendship to `status`; false if it was no longer pending.
pub async fn settle(db: impl SqliteExecutor<'_>, friendship_id: Uuid, status: FriendshipStatus) -> sqlx::Result<bool> {
    let result = sqlx::query("UPDATE friendships SET status=? WHERE id=? AND status='Pending'")
        .bind(status)
        .bind(friendship_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn pending_for(db: impl SqliteExecutor<'_>, receiver_id: Uuid) -> sqlx::Result<Vec<Friendship>> {
    sqlx::query_as(&format!(
        "SELECT {FRIENDSHIP_COLUMNS} FROM friendships WHERE receiver_id=? AND status='Pending' ORDER BY created_at"
    ))
    .bind(receiver_id)
    .fetch_all(db)
    .await
}

pub async fn accepted_for(db: impl SqliteExecutor<'_>, user_id: Uuid) -> sqlx::Result<Vec<Friendship>> {
    sqlx::query_as(&format!(
        "SELECT {FRIENDSHIP_COLUMNS} FROM friendships
         WHERE status='Accepted' AND (sender_id=? OR receiver_id=?) ORDER BY created_at"
    ))
    .bind(user_id)
    .bind(user_id)
    .fetch_all(db)
    .await
}
