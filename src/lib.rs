pub mod admin;
pub mod albums;
pub mod appresult;
pub mod auth;
pub mod config;
pub mod db;
pub mod groups;
pub mod home;
pub mod identity;
pub mod messages;
pub mod moderation;
pub mod policy;
pub mod principal;
pub mod profiles;
pub mod res;
pub mod session;

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequest, Request},
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Json, Router,
};
use axum_extra::extract::Form;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};
use config::Config;
use identity::{CredentialStore, TokenIssuer};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub credentials: Arc<dyn CredentialStore>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub config: Arc<Config>,
}

/// The whole HTTP surface: `/api/auth` plus the controller/action routes,
/// the latter behind the access gate.
pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(state.config.session_inactivity_minutes)));

    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    let mvc = Router::new()
        .route("/", get(home::index))
        .nest("/Home", home::router())
        .nest("/Profile", profiles::router())
        .nest("/Album", albums::router())
        .nest("/Message", messages::router())
        .nest("/Group", groups::router())
        .nest("/Moderator", moderation::router())
        .nest("/Admin", admin::router())
        .layer(from_fn(principal::access_gate));

    Router::new()
        .nest("/api/auth", auth::router())
        .merge(mvc)
        .layer(from_fn_with_state(state.clone(), principal::resolve_principal))
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Request body accepted either as JSON or as an HTML form. Repeated form
/// keys collect into sequence fields.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
            Ok(Payload(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::BadRequest(rejection.to_string()))?;
            Ok(Payload(value))
        }
    }
}

/// Trims `value` and rejects it when nothing is left.
pub fn required<'a>(value: &'a str, what: &str) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{what} is required")));
    }
    Ok(value)
}
