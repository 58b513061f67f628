use std::{collections::BTreeSet, convert::Infallible};

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, OriginalUri, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{db::{models::Role, users}, policy, session::USER_ID, AppError, AppResult, AppState};

/// The user behind a request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub roles: BTreeSet<Role>,
}

impl Principal {
    pub fn new(user_id: Uuid, email: &str, roles: BTreeSet<Role>) -> Self {
        Self { user_id, email: email.to_owned(), roles }
    }

    pub fn is_in_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Resolves the principal from a bearer token, falling back to the cookie
/// session, and stores it in the request extensions.
pub async fn resolve_principal(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let from_token = match bearer_token(request.headers()) {
        Some(token) => match state.tokens.verify(token) {
            Ok(user_id) => Some(user_id),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unusable bearer token");
                None
            }
        },
        None => None,
    };
    let user_id = match from_token {
        Some(user_id) => Some(user_id),
        None => session.get::<Uuid>(USER_ID).await?,
    };

    if let Some(user_id) = user_id {
        match users::find_by_id(&state.db_pool, user_id).await? {
            Some(user) => {
                let roles = users::roles(&state.db_pool, user.id).await?;
                request.extensions_mut().insert(Principal::new(user.id, &user.email, roles));
            }
            None => {
                tracing::debug!(%user_id, "credentials name a user that no longer exists");
                session.remove::<Uuid>(USER_ID).await?;
            }
        }
    }

    Ok(next.run(request).await)
}

/// `/{controller}/{action}/...`, with the conventional `Home`/`Index` defaults.
pub fn route_of(path: &str) -> (&str, &str) {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let controller = segments.next().unwrap_or("Home");
    let action = segments.next().unwrap_or("Index");
    (controller, action)
}

/// Applies [`policy::admit`] to controller/action routes.
pub async fn access_gate(request: Request, next: Next) -> AppResult<Response> {
    let path = match request.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri.path().to_owned(),
        None => request.uri().path().to_owned(),
    };
    let (controller, action) = route_of(&path);

    if let Err(err) = policy::admit(request.extensions().get::<Principal>(), controller, action).require() {
        tracing::info!(controller, action, "request stopped at the access gate");
        return Err(err);
    }

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))
    }
}

impl<S> OptionalFromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Principal>().cloned())
    }
}
