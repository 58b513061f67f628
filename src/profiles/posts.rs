use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::{content, models::Post, profiles},
    policy::{self, Action, Resource},
    principal::Principal,
    required, AppError, AppResult, AppState, Payload,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    /// Defaults to the caller's own profile.
    pub profile_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    pub content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(form): Payload<CreatePost>,
) -> AppResult<Json<Post>> {
    let profile = match form.profile_id {
        Some(profile_id) => profiles::find_by_id(&db_pool, profile_id)
            .await?
            .ok_or_else(|| AppError::not_found("profile"))?,
        None => super::own_profile(&db_pool, &principal).await?,
    };
    policy::evaluate(Some(&principal), Resource::Content { owner: profile.user_id }, Action::Create).require()?;

    let body = required(&form.content, "content")?;
    let post = content::insert_post(&db_pool, profile.id, form.title.trim(), body).await?;
    Ok(Json(post))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRef {
    pub post_id: Uuid,
}

/// Removes a post; shared with the moderation screen.
pub(crate) async fn remove(db_pool: &SqlitePool, principal: &Principal, post_id: Uuid) -> AppResult<()> {
    let post = content::find_post(db_pool, post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post"))?;
    let profile = profiles::find_by_id(db_pool, post.profile_id)
        .await?
        .ok_or_else(|| AppError::not_found("profile"))?;

    policy::evaluate(Some(principal), Resource::Content { owner: profile.user_id }, Action::Delete).require()?;
    content::delete_post(db_pool, post.id).await?;

    tracing::info!(%post_id, by = %principal.user_id, "post deleted");
    Ok(())
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(PostRef { post_id }): Payload<PostRef>,
) -> AppResult<StatusCode> {
    remove(&db_pool, &principal, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
