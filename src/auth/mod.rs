use axum::{routing::{get, post}, Router};
use sqlx::SqlitePool;

use crate::{
    appresult::{is_unique_violation, FieldError},
    db::{models::{Profile, Role, User, Visibility}, profiles, users},
    identity::CredentialStore,
    AppError, AppResult, AppState,
};

mod login;
mod logout;
mod register;

pub use login::login;
pub use logout::logout;
pub use register::register;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(register::status))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Field errors for a registration attempt; empty when the input is acceptable.
pub fn validate_credentials(email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let looks_like_email = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !looks_like_email {
        errors.push(FieldError::new("email", "The Email field is not a valid e-mail address."));
    }

    let length = password.chars().count();
    if !(6..=100).contains(&length) {
        errors.push(FieldError::new("password", "Passwords must be between 6 and 100 characters."));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new("password", "Passwords must have at least one digit ('0'-'9')."));
    }
    if !password.chars().any(char::is_lowercase) {
        errors.push(FieldError::new("password", "Passwords must have at least one lowercase ('a'-'z')."));
    }
    if !password.chars().any(char::is_uppercase) {
        errors.push(FieldError::new("password", "Passwords must have at least one uppercase ('A'-'Z')."));
    }

    errors
}

fn email_taken(email: &str) -> AppError {
    AppError::Validation(vec![FieldError::new("email", format!("Email '{email}' is already taken."))])
}

/// Creates the user, its public profile and its role in one transaction.
pub async fn create_account(
    db_pool: &SqlitePool,
    credentials: &dyn CredentialStore,
    email: &str,
    password: &str,
    role: Role,
) -> AppResult<(User, Profile)> {
    let email = email.trim();
    let errors = validate_credentials(email, password);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if users::find_by_email(db_pool, email).await?.is_some() {
        return Err(email_taken(email));
    }

    let password_hash = credentials.hash_password(password)?;
    let name = email.split('@').next().unwrap_or(email);

    let mut tx = db_pool.begin().await?;
    let user = match users::insert(&mut *tx, email, &password_hash).await {
        Ok(user) => user,
        Err(err) if is_unique_violation(&err) => return Err(email_taken(email)),
        Err(err) => return Err(err.into()),
    };
    let profile = profiles::insert(&mut *tx, user.id, name, Visibility::Public).await?;
    users::add_role(&mut *tx, user.id, role).await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, %role, "account created");
    Ok((user, profile))
}

/// Makes sure a moderator account exists for `email`; leaves an already
/// registered address untouched.
pub async fn bootstrap_moderator(
    db_pool: &SqlitePool,
    credentials: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> AppResult<()> {
    if users::find_by_email(db_pool, email.trim()).await?.is_some() {
        tracing::debug!(email, "bootstrap moderator already registered");
        return Ok(());
    }
    create_account(db_pool, credentials, email, password, Role::Moderator).await?;
    Ok(())
}
