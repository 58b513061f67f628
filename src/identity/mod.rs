//! Password hashing and bearer tokens, injected into the app as capabilities
//! so tests can swap in cheap deterministic versions.

mod credentials;
pub mod mock;
mod tokens;

use uuid::Uuid;

use crate::AppResult;

pub use credentials::Argon2Credentials;
pub use tokens::{Claims, JwtIssuer};

pub trait CredentialStore: Send + Sync {
    fn hash_password(&self, password: &str) -> AppResult<String>;
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: Uuid, email: &str) -> AppResult<String>;
    /// Returns the user id the token was issued for.
    fn verify(&self, token: &str) -> AppResult<Uuid>;
}
