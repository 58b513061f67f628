use std::collections::HashMap;

use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::{friendships, messages, models::{Destination, Message}, profiles, users},
    policy::{self, Action, Resource},
    principal::Principal,
    required, AppError, AppResult, AppState, Payload,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/Index", get(index))
        .route("/Conversation/{user_id}", get(conversation))
        .route("/SendMessage", post(send))
        .route("/DeleteMessage", post(delete))
}

/// One entry of the inbox: the other user and the latest message exchanged.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub last_message: Message,
    pub unread: usize,
}

#[debug_handler(state = AppState)]
pub(crate) async fn index(State(db_pool): State<SqlitePool>, principal: Principal) -> AppResult<Json<Vec<ConversationSummary>>> {
    let me = principal.user_id;
    let mut summaries: Vec<ConversationSummary> = Vec::new();
    let mut seen: HashMap<Uuid, usize> = HashMap::new();

    // newest first, so the first message per counterpart is the latest
    for message in messages::direct_for(&db_pool, me).await? {
        let Some(Destination::User(receiver)) = message.destination() else {
            continue;
        };
        let other = if message.sender_id == me { receiver } else { message.sender_id };
        let unread = usize::from(receiver == me && !message.is_read);

        match seen.get(&other).copied() {
            Some(i) => summaries[i].unread += unread,
            None => {
                seen.insert(other, summaries.len());
                summaries.push(ConversationSummary { user_id: other, name: None, last_message: message, unread });
            }
        }
    }

    for summary in &mut summaries {
        summary.name = profiles::find_by_user(&db_pool, summary.user_id).await?.map(|p| p.name);
    }
    Ok(Json(summaries))
}

async fn direct_line(db_pool: &SqlitePool, principal: &Principal, other: Uuid, action: Action) -> AppResult<()> {
    if users::find_by_id(db_pool, other).await?.is_none() {
        return Err(AppError::not_found("user"));
    }
    let friends = friendships::are_friends(db_pool, principal.user_id, other).await?;
    policy::evaluate(Some(principal), Resource::DirectLine { friends }, action).require()
}

/// Messages exchanged with `user_id`; marks the ones received as read.
#[debug_handler(state = AppState)]
pub(crate) async fn conversation(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<Message>>> {
    direct_line(&db_pool, &principal, user_id, Action::Read).await?;

    let marked = messages::mark_read(&db_pool, principal.user_id, user_id).await?;
    tracing::debug!(reader = %principal.user_id, %marked, "messages marked read");

    Ok(Json(messages::conversation(&db_pool, principal.user_id, user_id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub receiver_id: Uuid,
    #[serde(default)]
    pub content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(form): Payload<SendMessage>,
) -> AppResult<Json<Message>> {
    direct_line(&db_pool, &principal, form.receiver_id, Action::Send).await?;
    let content = required(&form.content, "content")?;

    let message = messages::insert(&db_pool, principal.user_id, Destination::User(form.receiver_id), content).await?;
    tracing::info!(message_id = %message.id, sender = %principal.user_id, receiver = %form.receiver_id, "message sent");
    Ok(Json(message))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub message_id: Uuid,
}

/// Removes a direct or group message; shared with the moderation screen.
pub(crate) async fn remove(db_pool: &SqlitePool, principal: &Principal, message_id: Uuid) -> AppResult<()> {
    let message = messages::find(db_pool, message_id)
        .await?
        .ok_or_else(|| AppError::not_found("message"))?;
    policy::evaluate(Some(principal), Resource::Message { sender: message.sender_id }, Action::Delete).require()?;

    messages::delete(db_pool, message.id).await?;
    tracing::info!(%message_id, by = %principal.user_id, "message deleted");
    Ok(())
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(MessageRef { message_id }): Payload<MessageRef>,
) -> AppResult<StatusCode> {
    remove(&db_pool, &principal, message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
