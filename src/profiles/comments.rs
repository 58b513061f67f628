use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::{comments, content, models::{Comment, CommentTarget, Profile, Verdict}, profiles},
    policy::{self, Action, Resource},
    principal::Principal,
    required, AppError, AppResult, AppState, Payload,
};

/// The profile owning the post or photo a comment hangs off.
async fn owner_of(db_pool: &SqlitePool, target: CommentTarget) -> AppResult<Profile> {
    let profile_id = match target {
        CommentTarget::Post(post_id) => content::find_post(db_pool, post_id)
            .await?
            .map(|post| post.profile_id)
            .ok_or_else(|| AppError::not_found("post"))?,
        CommentTarget::Photo(photo_id) => content::photo_profile_id(db_pool, photo_id)
            .await?
            .ok_or_else(|| AppError::not_found("photo"))?,
    };
    profiles::find_by_id(db_pool, profile_id)
        .await?
        .ok_or_else(|| AppError::not_found("profile"))
}

fn target_of(comment: &Comment) -> AppResult<CommentTarget> {
    match (comment.post_id, comment.photo_id) {
        (Some(post_id), None) => Ok(CommentTarget::Post(post_id)),
        (None, Some(photo_id)) => Ok(CommentTarget::Photo(photo_id)),
        _ => Err(anyhow::anyhow!("comment {} has no single parent", comment.id).into()),
    }
}

async fn add(db_pool: &SqlitePool, principal: &Principal, target: CommentTarget, content: &str) -> AppResult<Comment> {
    let profile = owner_of(db_pool, target).await?;
    let resource = super::as_resource(db_pool, Some(principal), &profile).await?;
    policy::evaluate(Some(principal), resource, Action::View).require()?;

    let content = required(content, "content")?;
    Ok(comments::insert(db_pool, principal.user_id, target, content).await?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostComment {
    pub post_id: Uuid,
    pub content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn add_to_post(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(form): Payload<PostComment>,
) -> AppResult<Json<Comment>> {
    Ok(Json(add(&db_pool, &principal, CommentTarget::Post(form.post_id), &form.content).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoComment {
    pub photo_id: Uuid,
    pub content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn add_to_photo(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(form): Payload<PhotoComment>,
) -> AppResult<Json<Comment>> {
    Ok(Json(add(&db_pool, &principal, CommentTarget::Photo(form.photo_id), &form.content).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRef {
    pub comment_id: Uuid,
}

async fn find(db_pool: &SqlitePool, comment_id: Uuid) -> AppResult<(Comment, Profile)> {
    let comment = comments::find(db_pool, comment_id)
        .await?
        .ok_or_else(|| AppError::not_found("comment"))?;
    let profile = owner_of(db_pool, target_of(&comment)?).await?;
    Ok((comment, profile))
}

async fn settle(db_pool: &SqlitePool, principal: &Principal, comment_id: Uuid, verdict: Verdict) -> AppResult<Comment> {
    let (comment, parent) = find(db_pool, comment_id).await?;
    let resource = Resource::Comment { author: comment.user_id, parent_owner: parent.user_id };
    policy::evaluate(Some(principal), resource, Action::Moderate).require()?;

    if !comments::settle(db_pool, comment.id, verdict.into()).await? {
        return Err(AppError::BadRequest("this comment has already been reviewed".to_owned()));
    }

    comments::find(db_pool, comment_id)
        .await?
        .ok_or_else(|| AppError::not_found("comment"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn approve(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(CommentRef { comment_id }): Payload<CommentRef>,
) -> AppResult<Json<Comment>> {
    Ok(Json(settle(&db_pool, &principal, comment_id, Verdict::Accept).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn reject(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(CommentRef { comment_id }): Payload<CommentRef>,
) -> AppResult<Json<Comment>> {
    Ok(Json(settle(&db_pool, &principal, comment_id, Verdict::Reject).await?))
}

/// Removes a comment; shared with the moderation screen.
pub(crate) async fn remove(db_pool: &SqlitePool, principal: &Principal, comment_id: Uuid) -> AppResult<()> {
    let (comment, parent) = find(db_pool, comment_id).await?;
    let resource = Resource::Comment { author: comment.user_id, parent_owner: parent.user_id };
    policy::evaluate(Some(principal), resource, Action::Delete).require()?;

    comments::delete(db_pool, comment.id).await?;
    tracing::info!(%comment_id, by = %principal.user_id, "comment deleted");
    Ok(())
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(CommentRef { comment_id }): Payload<CommentRef>,
) -> AppResult<StatusCode> {
    remove(&db_pool, &principal, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
