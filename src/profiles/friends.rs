use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    appresult::is_unique_violation,
    db::{friendships, models::{Friendship, Profile, Verdict}, profiles, users},
    policy::{self, Action, Resource},
    principal::Principal,
    AppError, AppResult, AppState, Payload,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub receiver_id: Uuid,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(FriendRequest { receiver_id }): Payload<FriendRequest>,
) -> AppResult<Json<Friendship>> {
    if receiver_id == principal.user_id {
        return Err(AppError::BadRequest("you cannot send a friend request to yourself".to_owned()));
    }
    if users::find_by_id(&db_pool, receiver_id).await?.is_none() {
        return Err(AppError::not_found("user"));
    }
    if friendships::between(&db_pool, principal.user_id, receiver_id).await?.is_some() {
        return Err(AppError::Conflict("a friendship or request already exists between these users".to_owned()));
    }

    let friendship = match friendships::insert_pending(&db_pool, principal.user_id, receiver_id).await {
        Ok(friendship) => friendship,
        Err(err) if is_unique_violation(&err) => {
            return Err(AppError::Conflict("a friendship or request already exists between these users".to_owned()));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(friendship_id = %friendship.id, sender = %principal.user_id, receiver = %receiver_id, "friend request sent");
    Ok(Json(friendship))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipRef {
    pub friendship_id: Uuid,
}

async fn respond(db_pool: &SqlitePool, principal: &Principal, friendship_id: Uuid, verdict: Verdict) -> AppResult<Friendship> {
    let friendship = friendships::find(db_pool, friendship_id)
        .await?
        .ok_or_else(|| AppError::not_found("friend request"))?;

    let resource = Resource::Friendship { sender: friendship.sender_id, receiver: friendship.receiver_id };
    policy::evaluate(Some(principal), resource, Action::Respond).require()?;

    if !friendships::settle(db_pool, friendship.id, verdict.into()).await? {
        return Err(AppError::BadRequest("this friend request has already been answered".to_owned()));
    }

    tracing::info!(%friendship_id, ?verdict, "friend request answered");
    friendships::find(db_pool, friendship_id)
        .await?
        .ok_or_else(|| AppError::not_found("friend request"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn accept(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(FriendshipRef { friendship_id }): Payload<FriendshipRef>,
) -> AppResult<Json<Friendship>> {
    Ok(Json(respond(&db_pool, &principal, friendship_id, Verdict::Accept).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn reject(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(FriendshipRef { friendship_id }): Payload<FriendshipRef>,
) -> AppResult<Json<Friendship>> {
    Ok(Json(respond(&db_pool, &principal, friendship_id, Verdict::Reject).await?))
}

/// Pending requests addressed to the caller.
#[debug_handler(state = AppState)]
pub(crate) async fn requests(State(db_pool): State<SqlitePool>, principal: Principal) -> AppResult<Json<Vec<Friendship>>> {
    Ok(Json(friendships::pending_for(&db_pool, principal.user_id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn list(State(db_pool): State<SqlitePool>, principal: Principal) -> AppResult<Json<Vec<Profile>>> {
    let mut friends = Vec::new();
    for friendship in friendships::accepted_for(&db_pool, principal.user_id).await? {
        if let Some(profile) = profiles::find_by_user(&db_pool, friendship.other_party(principal.user_id)).await? {
            friends.push(profile);
        }
    }
    Ok(Json(friends))
}
