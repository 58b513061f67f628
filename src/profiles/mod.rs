use axum::{routing::{get, post}, Router};
use sqlx::SqlitePool;

use crate::{
    db::{friendships, models::Profile, profiles},
    policy::Resource,
    principal::Principal,
    AppError, AppResult, AppState,
};

pub(crate) mod comments;
mod friends;
mod page;
pub(crate) mod posts;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page::index))
        .route("/Index", get(page::index))
        .route("/View/{id}", get(page::view))
        .route("/Update", post(page::update))
        .route("/CreatePost", post(posts::create))
        .route("/DeletePost", post(posts::delete))
        .route("/SendFriendRequest", post(friends::send))
        .route("/AcceptFriendRequest", post(friends::accept))
        .route("/RejectFriendRequest", post(friends::reject))
        .route("/FriendRequests", get(friends::requests))
        .route("/Friends", get(friends::list))
        .route("/AddPostComment", post(comments::add_to_post))
        .route("/AddPhotoComment", post(comments::add_to_photo))
        .route("/ApproveComment", post(comments::approve))
        .route("/RejectComment", post(comments::reject))
        .route("/DeleteComment", post(comments::delete))
}

/// The caller's own profile.
pub(crate) async fn own_profile(db_pool: &SqlitePool, principal: &Principal) -> AppResult<Profile> {
    profiles::find_by_user(db_pool, principal.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("profile"))
}

/// Describes `profile` as seen by `principal`, for [`crate::policy::evaluate`].
pub(crate) async fn as_resource(db_pool: &SqlitePool, principal: Option<&Principal>, profile: &Profile) -> AppResult<Resource> {
    let friends = match principal {
        Some(principal) if principal.user_id != profile.user_id => {
            friendships::are_friends(db_pool, principal.user_id, profile.user_id).await?
        }
        _ => false,
    };
    Ok(Resource::Profile { owner: profile.user_id, visibility: profile.visibility, friends })
}
