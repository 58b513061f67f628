use std::env;

use rand::Rng;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub cors_origins: Vec<String>,
    pub session_inactivity_minutes: i64,
    pub bootstrap_moderator: Option<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub key: Vec<u8>,
    pub issuer: String,
    pub audience: String,
    pub lifetime_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime_hours", &self.lifetime_hours)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:deltasocial.db?mode=rwc".to_owned(),
            server: ServerConfig { host: "0.0.0.0".to_owned(), port: 8080 },
            jwt: JwtConfig {
                key: random_key(),
                issuer: "DeltaSocial".to_owned(),
                audience: "DeltaSocialUsers".to_owned(),
                lifetime_hours: 24,
            },
            cors_origins: vec!["http://localhost:3000".to_owned()],
            session_inactivity_minutes: 30,
            bootstrap_moderator: None,
        }
    }
}

impl Config {
    /// Reads the process environment; call `dotenv::dotenv()` first to pick up `.env`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let key = match lookup("JWT_KEY") {
            Some(key) if key.len() >= 32 => key.into_bytes(),
            Some(_) => anyhow::bail!("JWT_KEY must be at least 32 bytes"),
            None => {
                tracing::warn!("JWT_KEY not set, using a random key; tokens will not survive a restart");
                defaults.jwt.key
            }
        };

        let bootstrap_moderator = match (lookup("BOOTSTRAP_MODERATOR_EMAIL"), lookup("BOOTSTRAP_MODERATOR_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or(lookup("SERVER_PORT"), defaults.server.port, "SERVER_PORT")?,
            },
            jwt: JwtConfig {
                key,
                issuer: lookup("JWT_ISSUER").unwrap_or(defaults.jwt.issuer),
                audience: lookup("JWT_AUDIENCE").unwrap_or(defaults.jwt.audience),
                lifetime_hours: parse_or(lookup("JWT_LIFETIME_HOURS"), defaults.jwt.lifetime_hours, "JWT_LIFETIME_HOURS")?,
            },
            cors_origins: lookup("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            session_inactivity_minutes: parse_or(
                lookup("SESSION_INACTIVITY_MINUTES"),
                defaults.session_inactivity_minutes,
                "SESSION_INACTIVITY_MINUTES",
            )?,
            bootstrap_moderator,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T, key: &str) -> anyhow::Result<T> {
    match value {
        Some(value) => value.parse().map_err(|_| anyhow::anyhow!("{key} has an invalid value: {value}")),
        None => Ok(default),
    }
}

fn random_key() -> Vec<u8> {
    let mut key = [0u8; 32];
    rand::rng().fill(&mut key);
    key.to_vec()
}
