use chrono::Utc;
use sqlx::SqliteExecutor;
use uuid::Uuid;

use super::models::{ApprovalStatus, Comment, CommentTarget};

const COMMENT_COLUMNS: &str = "id,user_id,post_id,photo_id,content,approval_status,created_at";

/// New comments always start out `Pending`.
pub async fn insert(db: impl SqliteExecutor<'_>, user_id: Uuid, target: CommentTarget, content: &str) -> sqlx::Result<Comment> {
    let (post_id, photo_id) = match target {
        CommentTarget::Post(id) => (Some(id), None),
        CommentTarget::Photo(id) => (None, Some(id)),
    };
    let comment = Comment {
        id: Uuid::now_v7(),
        user_id,
        post_id,
        photo_id,
        content: content.to_owned(),
        approval_status: ApprovalStatus::Pending,
        created_at: Utc::now(),
    };
    sqlx::query(
        "INSERT INTO comments (id,user_id,post_id,photo_id,content,approval_status,created_at) VALUES (?,?,?,?,?,?,?)",
    )
    .bind(comment.id)
    .bind(comment.user_id)
    .bind(comment.post_id)
    .bind(comment.photo_id)
    .bind(&comment.content)
    .bind(comment.approval_status)
    .bind(comment.created_at)
    .execute(db)
    .await?;
    Ok(comment)
}

pub async fn find(db: impl SqliteExecutor<'_>, comment_id: Uuid) -> sqlx::Result<Option<Comment>> {
    sqlx::query_as(&format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id=?"))
        .bind(comment_id)
        .fetch_optional(db)
        .await
}

/// Moves a `Pending` comment to `status`. Returns false when the comment
/// had already left `Pending`, so two racing verdicts apply only once.
pub async fn settle(db: impl SqliteExecutor<'_>, comment_id: Uuid, status: ApprovalStatus) -> sqlx::Result<bool> {
    let result = sqlx::query("UPDATE comments SET approval_status=? WHERE id=? AND approval_status='Pending'")
        .bind(status)
        .bind(comment_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete(db: impl SqliteExecutor<'_>, comment_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id=?")
        .bind(comment_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn recent(db: impl SqliteExecutor<'_>, limit: i64) -> sqlx::Result<Vec<Comment>> {
    sqlx::query_as(&format!("SELECT {COMMENT_COLUMNS} FROM comments ORDER BY created_at DESC, id DESC LIMIT ?"))
        .bind(limit)
        .fetch_all(db)
        .await
}
