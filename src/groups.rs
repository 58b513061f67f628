use axum::{
    debug_handler,
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::{groups, messages, models::{Destination, Group, Message, Profile}},
    policy::{self, Action, Resource},
    principal::Principal,
    profiles::own_profile,
    required, AppError, AppResult, AppState, Payload,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/Index", get(index))
        .route("/View/{id}", get(view))
        .route("/Create", post(create))
        .route("/Join", post(join))
        .route("/Leave", post(leave))
        .route("/Chat/{id}", get(chat))
        .route("/SendMessage", post(send))
}

async fn find(db_pool: &SqlitePool, group_id: Uuid) -> AppResult<Group> {
    groups::find(db_pool, group_id)
        .await?
        .ok_or_else(|| AppError::not_found("group"))
}

async fn membership(db_pool: &SqlitePool, principal: Option<&Principal>, group_id: Uuid) -> AppResult<Resource> {
    let member = match principal {
        Some(principal) => groups::is_member(db_pool, group_id, principal.user_id).await?,
        None => false,
    };
    Ok(Resource::Group { member })
}

#[debug_handler(state = AppState)]
pub(crate) async fn index(State(db_pool): State<SqlitePool>) -> AppResult<Json<Vec<Group>>> {
    Ok(Json(groups::list(&db_pool).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    #[serde(flatten)]
    pub group: Group,
    pub members: Vec<Profile>,
    pub is_member: bool,
}

#[debug_handler(state = AppState)]
pub(crate) async fn view(
    State(db_pool): State<SqlitePool>,
    principal: Option<Principal>,
    Path(group_id): Path<Uuid>,
) -> AppResult<Json<GroupView>> {
    let group = find(&db_pool, group_id).await?;
    let resource = membership(&db_pool, principal.as_ref(), group.id).await?;
    policy::evaluate(principal.as_ref(), resource, Action::View).require()?;

    let members = groups::members(&db_pool, group.id).await?;
    let is_member = matches!(resource, Resource::Group { member: true });
    Ok(Json(GroupView { group, members, is_member }))
}

#[derive(Debug, Deserialize)]
pub struct CreateGroup {
    pub name: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(form): Payload<CreateGroup>,
) -> AppResult<Json<Group>> {
    policy::evaluate(Some(&principal), Resource::Group { member: false }, Action::Create).require()?;
    let name = required(&form.name, "name")?;

    let group = groups::insert(&db_pool, name).await?;
    tracing::info!(group_id = %group.id, by = %principal.user_id, "group created");
    Ok(Json(group))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRef {
    pub group_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipChange {
    pub group_id: Uuid,
    pub is_member: bool,
    /// False when the call changed nothing.
    pub changed: bool,
}

#[debug_handler(state = AppState)]
pub(crate) async fn join(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(GroupRef { group_id }): Payload<GroupRef>,
) -> AppResult<Json<MembershipChange>> {
    let group = find(&db_pool, group_id).await?;
    let profile = own_profile(&db_pool, &principal).await?;

    let changed = groups::join(&db_pool, group.id, profile.id).await?;
    Ok(Json(MembershipChange { group_id, is_member: true, changed }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn leave(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(GroupRef { group_id }): Payload<GroupRef>,
) -> AppResult<Json<MembershipChange>> {
    let group = find(&db_pool, group_id).await?;
    let profile = own_profile(&db_pool, &principal).await?;

    let changed = groups::leave(&db_pool, group.id, profile.id).await?;
    Ok(Json(MembershipChange { group_id, is_member: false, changed }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn chat(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Path(group_id): Path<Uuid>,
) -> AppResult<Json<Vec<Message>>> {
    let group = find(&db_pool, group_id).await?;
    let resource = membership(&db_pool, Some(&principal), group.id).await?;
    policy::evaluate(Some(&principal), resource, Action::Read).require()?;

    Ok(Json(messages::in_group(&db_pool, group.id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessage {
    pub group_id: Uuid,
    #[serde(default)]
    pub content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(form): Payload<GroupMessage>,
) -> AppResult<Json<Message>> {
    let group = find(&db_pool, form.group_id).await?;
    let resource = membership(&db_pool, Some(&principal), group.id).await?;
    policy::evaluate(Some(&principal), resource, Action::Send).require()?;
    let content = required(&form.content, "content")?;

    Ok(Json(messages::insert(&db_pool, principal.user_id, Destination::Group(group.id), content).await?))
}
