use axum::{http::{header, StatusCode}, response::{IntoResponse, Redirect, Response}, Json};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

pub const ACCESS_DENIED_PATH: &str = "/Home/AccessDenied";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self { field: field.to_owned(), message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    /// Missing authentication, or a resource hidden from the caller.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Visitor outside the allow-list. Rendered as a redirect, not a failure.
    #[error("access denied")]
    AccessDenied,

    #[error(transparent)]
    Other(anyhow::Error),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub fn status(&self) -> StatusCode {
        use AppError::*;
        match self {
            NotFound(_) => StatusCode::NOT_FOUND,
            Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Forbidden(_) => StatusCode::FORBIDDEN,
            BadRequest(_) | Validation(_) | Other(_) => StatusCode::BAD_REQUEST,
            Conflict(_) => StatusCode::CONFLICT,
            AccessDenied => StatusCode::SEE_OTHER,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::AccessDenied => Redirect::to(ACCESS_DENIED_PATH).into_response(),
            AppError::Validation(errors) => {
                (status, Json(json!({ "errors": errors, "status": status.as_u16() }))).into_response()
            }
            AppError::Other(err) => {
                // unexpected failures still end the request with a 400
                tracing::error!(error = %err, backtrace = %err.backtrace(), "request failed");
                (status, Json(json!({ "error": err.to_string(), "status": status.as_u16() }))).into_response()
            }
            other => {
                let mut response = (status, Json(json!({ "error": other.to_string(), "status": status.as_u16() })))
                    .into_response();
                if status == StatusCode::UNAUTHORIZED {
                    response.headers_mut().insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static("Bearer"));
                }
                response
            }
        }
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self::Other(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self::Other(anyhow::Error::msg(err.to_owned()))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("record not found".to_owned()),
            err => Self::Other(anyhow::Error::from(err)),
        }
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Other(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(anyhow::Error);
apperr_impl!(serde_json::Error);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(sqlx::migrate::MigrateError);
apperr_impl!(axum::Error);

/// True when a write was refused by a UNIQUE index.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(AppError::not_found("profile").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::from("boom").status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        assert!(matches!(AppError::from(sqlx::Error::RowNotFound), AppError::NotFound(_)));
    }

    #[test]
    fn access_denied_redirects() {
        let response = AppError::AccessDenied.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], ACCESS_DENIED_PATH);
    }
}
