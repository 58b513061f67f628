use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::{db::models::Role, identity::CredentialStore, AppResult, AppState, Payload};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[debug_handler]
pub(crate) async fn status() -> Json<Value> {
    Json(json!({ "message": "Auth controller is working!" }))
}

#[debug_handler(state = AppState)]
pub async fn register(
    State(db_pool): State<SqlitePool>,
    State(credentials): State<Arc<dyn CredentialStore>>,
    Payload(RegisterRequest { email, password }): Payload<RegisterRequest>,
) -> AppResult<Json<Value>> {
    super::create_account(&db_pool, credentials.as_ref(), &email, &password, Role::User).await?;
    Ok(Json(json!({ "message": "Registration successful" })))
}
