use axum::{debug_handler, response::{Html, IntoResponse}, routing::get, Router};

use crate::{include_res, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/Index", get(index))
        .route("/Privacy", get(privacy))
        .route("/AccessDenied", get(access_denied))
}

#[debug_handler]
pub async fn index() -> impl IntoResponse {
    Html(include_res!(str, "/pages/index.html"))
}

#[debug_handler]
pub async fn privacy() -> impl IntoResponse {
    Html(include_res!(str, "/pages/privacy.html"))
}

#[debug_handler]
pub async fn access_denied() -> impl IntoResponse {
    Html(include_res!(str, "/pages/access_denied.html"))
}
