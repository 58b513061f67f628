use axum::{
    debug_handler,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    albums,
    db::{comments, content, models::{Comment, Post, Role}, users},
    messages,
    policy::{self, Action, Resource},
    principal::Principal,
    profiles::{comments as post_comments, posts},
    AppError, AppResult, AppState, Payload,
};

const RECENT_LIMIT: i64 = 50;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/Index", get(index))
        .route("/DeletePost", post(delete_post))
        .route("/DeleteComment", post(delete_comment))
        .route("/DeletePhoto", post(delete_photo))
        .route("/DeleteMessage", post(delete_message))
        .route("/BlockUser", post(block_user))
        .route("/UnblockUser", post(unblock_user))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn index(State(db_pool): State<SqlitePool>, principal: Principal) -> AppResult<Json<Overview>> {
    policy::evaluate(Some(&principal), Resource::Site, Action::View).require()?;

    Ok(Json(Overview {
        posts: content::recent_posts(&db_pool, RECENT_LIMIT).await?,
        comments: comments::recent(&db_pool, RECENT_LIMIT).await?,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(alias = "postId", alias = "commentId", alias = "photoId", alias = "messageId", alias = "userId")]
    pub id: Uuid,
}

fn moderator(principal: &Principal) -> AppResult<()> {
    policy::evaluate(Some(principal), Resource::Site, Action::Delete).require()
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_post(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(Target { id }): Payload<Target>,
) -> AppResult<StatusCode> {
    moderator(&principal)?;
    posts::remove(&db_pool, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_comment(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(Target { id }): Payload<Target>,
) -> AppResult<StatusCode> {
    moderator(&principal)?;
    post_comments::remove(&db_pool, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_photo(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(Target { id }): Payload<Target>,
) -> AppResult<StatusCode> {
    moderator(&principal)?;
    albums::remove_photo(&db_pool, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_message(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(Target { id }): Payload<Target>,
) -> AppResult<StatusCode> {
    moderator(&principal)?;
    messages::remove(&db_pool, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockState {
    pub user_id: Uuid,
    pub blocked: bool,
}

async fn set_blocked(db_pool: &SqlitePool, principal: &Principal, user_id: Uuid, blocked: bool) -> AppResult<BlockState> {
    policy::evaluate(Some(principal), Resource::Site, Action::Administer).require()?;
    if users::find_by_id(db_pool, user_id).await?.is_none() {
        return Err(AppError::not_found("user"));
    }

    if blocked {
        users::add_role(db_pool, user_id, Role::Blocked).await?;
    } else {
        users::remove_role(db_pool, user_id, Role::Blocked).await?;
    }
    tracing::info!(%user_id, blocked, by = %principal.user_id, "block state changed");
    Ok(BlockState { user_id, blocked })
}

#[debug_handler(state = AppState)]
pub(crate) async fn block_user(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(Target { id }): Payload<Target>,
) -> AppResult<Json<BlockState>> {
    Ok(Json(set_blocked(&db_pool, &principal, id, true).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn unblock_user(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(Target { id }): Payload<Target>,
) -> AppResult<Json<BlockState>> {
    Ok(Json(set_blocked(&db_pool, &principal, id, false).await?))
}
