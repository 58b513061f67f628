use chrono::Utc;
use sqlx::SqliteExecutor;
use uuid::Uuid;

use super::models::{Destination, Message};

const MESSAGE_COLUMNS: &str = "id,sender_id,receiver_id,group_id,content,is_read,created_at";

pub async fn insert(db: impl SqliteExecutor<'_>, sender_id: Uuid, destination: Destination, content: &str) -> sqlx::Result<Message> {
    let (receiver_id, group_id) = destination.columns();
    let message = Message {
        id: Uuid::now_v7(),
        sender_id,
        receiver_id,
        group_id,
        content: content.to_owned(),
        is_read: false,
        created_at: Utc::now(),
    };
    sqlx::query("INSERT INTO messages (id,sender_id,receiver_id,group_id,content,is_read,created_at) VALUES (?,?,?,?,?,?,?)")
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(message.group_id)
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.created_at)
        .execute(db)
        .await?;
    Ok(message)
}

pub async fn find(db: impl SqliteExecutor<'_>, message_id: Uuid) -> sqlx::Result<Option<Message>> {
    sqlx::query_as(&format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id=?"))
        .bind(message_id)
        .fetch_optional(db)
        .await
}

pub async fn delete(db: impl SqliteExecutor<'_>, message_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM messages WHERE id=?")
        .bind(message_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Direct messages exchanged between two users, oldest first.
pub async fn conversation(db: impl SqliteExecutor<'_>, a: Uuid, b: Uuid) -> sqlx::Result<Vec<Message>> {
    sqlx::query_as(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages
         WHERE (sender_id=? AND receiver_id=?) OR (sender_id=? AND receiver_id=?)
         ORDER BY created_at, id"
    ))
    .bind(a)
    .bind(b)
    .bind(b)
    .bind(a)
    .fetch_all(db)
    .await
}

/// Marks everything `sender_id` sent to `reader_id` as read.
pub async fn mark_read(db: impl SqliteExecutor<'_>, reader_id: Uuid, sender_id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE messages SET is_read=TRUE WHERE receiver_id=? AND sender_id=? AND is_read=FALSE")
        .bind(reader_id)
        .bind(sender_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

/// Every direct message `user_id` sent or received, newest first.
pub async fn direct_for(db: impl SqliteExecutor<'_>, user_id: Uuid) -> sqlx::Result<Vec<Message>> {
    sqlx::query_as(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages
         WHERE receiver_id IS NOT NULL AND (sender_id=? OR receiver_id=?)
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn in_group(db: impl SqliteExecutor<'_>, group_id: Uuid) -> sqlx::Result<Vec<Message>> {
    sqlx::query_as(&format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE group_id=? ORDER BY created_at, id"))
        .bind(group_id)
        .fetch_all(db)
        .await
}
