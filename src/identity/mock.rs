//! Identity capabilities for tests: no hashing cost, predictable tokens.

use uuid::Uuid;

use crate::{AppError, AppResult};

use super::{CredentialStore, TokenIssuer};

const PLAIN_PREFIX: &str = "plain$";
const TOKEN_PREFIX: &str = "mock-token.";

#[derive(Debug, Clone, Default)]
pub struct PlainCredentials;

impl CredentialStore for PlainCredentials {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("{PLAIN_PREFIX}{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let stored = hash.strip_prefix(PLAIN_PREFIX).ok_or("hash was not made by PlainCredentials")?;
        Ok(stored == password)
    }
}

/// Tokens are the user id behind a fixed prefix.
#[derive(Debug, Clone, Default)]
pub struct StaticTokens;

impl TokenIssuer for StaticTokens {
    fn issue(&self, user_id: Uuid, _email: &str) -> AppResult<String> {
        Ok(format!("{TOKEN_PREFIX}{user_id}"))
    }

    fn verify(&self, token: &str) -> AppResult<Uuid> {
        token
            .strip_prefix(TOKEN_PREFIX)
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| AppError::Unauthorized("invalid token".to_owned()))
    }
}
