use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::JwtConfig, AppError, AppResult};

use super::TokenIssuer;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub jti: Uuid,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 tokens signed with the configured key.
pub struct JwtIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl JwtIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&config.key),
            decoding_key: DecodingKey::from_secret(&config.key),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime: Duration::hours(config.lifetime_hours),
        }
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_owned(),
            jti: Uuid::now_v7(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::from(format!("failed to create token: {e}")))
    }

    fn verify(&self, token: &str) -> AppResult<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("invalid token: {e}")))?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: &[u8], lifetime_hours: i64) -> JwtConfig {
        JwtConfig {
            key: key.to_vec(),
            issuer: "DeltaSocial".to_owned(),
            audience: "DeltaSocialUsers".to_owned(),
            lifetime_hours,
        }
    }

    #[test]
    fn issued_token_verifies_to_its_subject() {
        let issuer = JwtIssuer::new(&config(b"0123456789abcdef0123456789abcdef", 24));
        let user_id = Uuid::now_v7();
        let token = issuer.issue(user_id, "alice@x.com").unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn rejects_foreign_and_expired_tokens() {
        let ours = JwtIssuer::new(&config(b"0123456789abcdef0123456789abcdef", 24));
        let theirs = JwtIssuer::new(&config(b"fedcba9876543210fedcba9876543210", 24));
        let token = theirs.issue(Uuid::now_v7(), "mallory@x.com").unwrap();
        assert!(matches!(ours.verify(&token), Err(AppError::Unauthorized(_))));

        let expired = JwtIssuer::new(&config(b"0123456789abcdef0123456789abcdef", -2));
        let token = expired.issue(Uuid::now_v7(), "old@x.com").unwrap();
        assert!(matches!(ours.verify(&token), Err(AppError::Unauthorized(_))));
        assert!(matches!(ours.verify("not.a.token"), Err(AppError::Unauthorized(_))));
    }
}
