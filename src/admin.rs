use std::{collections::BTreeSet, sync::Arc};

use axum::{
    debug_handler,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    appresult::FieldError,
    auth::create_account,
    db::{models::Role, users},
    identity::CredentialStore,
    policy::{self, Action, Resource},
    principal::Principal,
    AppError, AppResult, AppState, Payload,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/Index", get(index))
        .route("/EditUser", post(edit_user))
        .route("/CreateModerator", post(create_moderator))
        .route("/ResetUserRoles", post(reset_user_roles))
}

fn administrator(principal: &Principal) -> AppResult<()> {
    policy::evaluate(Some(principal), Resource::Site, Action::Administer).require()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub roles: BTreeSet<Role>,
}

async fn summary(db_pool: &SqlitePool, user_id: Uuid) -> AppResult<UserSummary> {
    let user = users::find_by_id(db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;
    let roles = users::roles(db_pool, user.id).await?;
    Ok(UserSummary { id: user.id, email: user.email, roles })
}

#[debug_handler(state = AppState)]
pub(crate) async fn index(State(db_pool): State<SqlitePool>, principal: Principal) -> AppResult<Json<Vec<UserSummary>>> {
    administrator(&principal)?;

    let mut summaries = Vec::new();
    for user in users::list(&db_pool).await? {
        let roles = users::roles(&db_pool, user.id).await?;
        summaries.push(UserSummary { id: user.id, email: user.email, roles });
    }
    Ok(Json(summaries))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditUser {
    pub user_id: Uuid,
    #[serde(default)]
    pub selected_roles: Vec<Role>,
    #[serde(default)]
    pub is_visitor: bool,
}

/// The role set an edit produces. `Visitor` only ever comes from the
/// `is_visitor` flag, never from the selected roles.
pub fn edited_roles(selected: &[Role], is_visitor: bool) -> BTreeSet<Role> {
    let mut roles: BTreeSet<Role> = selected.iter().copied().filter(|r| *r != Role::Visitor).collect();
    if is_visitor {
        roles.insert(Role::Visitor);
    }
    roles
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_user(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(form): Payload<EditUser>,
) -> AppResult<Json<UserSummary>> {
    administrator(&principal)?;
    if users::find_by_id(&db_pool, form.user_id).await?.is_none() {
        return Err(AppError::not_found("user"));
    }

    let roles = edited_roles(&form.selected_roles, form.is_visitor);
    users::set_roles(&db_pool, form.user_id, &roles).await?;

    tracing::info!(user_id = %form.user_id, ?roles, by = %principal.user_id, "roles edited");
    summary(&db_pool, form.user_id).await.map(Json)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModerator {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_moderator(
    State(db_pool): State<SqlitePool>,
    State(credentials): State<Arc<dyn CredentialStore>>,
    principal: Principal,
    Payload(form): Payload<CreateModerator>,
) -> AppResult<Json<UserSummary>> {
    administrator(&principal)?;
    if form.password != form.confirm_password {
        return Err(AppError::Validation(vec![FieldError::new(
            "confirmPassword",
            "The password and confirmation password do not match.",
        )]));
    }

    let (user, _) = create_account(&db_pool, credentials.as_ref(), &form.email, &form.password, Role::Moderator).await?;
    summary(&db_pool, user.id).await.map(Json)
}

#[derive(Debug, Deserialize)]
pub struct ResetRoles {
    pub email: String,
}

/// Drops every role the user holds and leaves them a plain `User`.
#[debug_handler(state = AppState)]
pub(crate) async fn reset_user_roles(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(ResetRoles { email }): Payload<ResetRoles>,
) -> AppResult<Json<UserSummary>> {
    administrator(&principal)?;
    let user = users::find_by_email(&db_pool, email.trim())
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    users::set_roles(&db_pool, user.id, &BTreeSet::from([Role::User])).await?;
    tracing::info!(user_id = %user.id, by = %principal.user_id, "roles reset");
    summary(&db_pool, user.id).await.map(Json)
}
