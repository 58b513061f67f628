use std::sync::Arc;

use axum::{debug_handler, extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    db::{models::Role, users},
    identity::{CredentialStore, TokenIssuer},
    session::USER_ID,
    AppError, AppResult, AppState, Payload,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn invalid_login() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid email or password" }))).into_response()
}

#[debug_handler(state = AppState)]
pub async fn login(
    State(db_pool): State<SqlitePool>,
    State(credentials): State<Arc<dyn CredentialStore>>,
    State(tokens): State<Arc<dyn TokenIssuer>>,
    session: Session,
    Payload(LoginRequest { email, password }): Payload<LoginRequest>,
) -> AppResult<Response> {
    let Some(user) = users::find_by_email(&db_pool, email.trim()).await? else {
        return Ok(invalid_login());
    };

    if !credentials.verify_password(&password, &user.password_hash)? {
        tracing::info!(user_id = %user.id, "failed login");
        return Ok(invalid_login());
    }

    if users::roles(&db_pool, user.id).await?.contains(&Role::Blocked) {
        return Err(AppError::Forbidden("this account is blocked".to_owned()));
    }

    let token = tokens.issue(user.id, &user.email)?;
    session.cycle_id().await?;
    session.insert(USER_ID, user.id).await?;

    tracing::info!(user_id = %user.id, "welcome");
    Ok(Json(json!({ "token": token })).into_response())
}
