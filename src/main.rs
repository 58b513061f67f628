use std::sync::Arc;

use deltasocial::{
    app, auth,
    config::Config,
    db,
    identity::{Argon2Credentials, JwtIssuer},
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    let config = Config::from_env()?;
    let db_pool = db::init_pool(&config.database_url).await?;

    let credentials = Arc::new(Argon2Credentials);
    if let Some((email, password)) = &config.bootstrap_moderator {
        auth::bootstrap_moderator(&db_pool, credentials.as_ref(), email, password).await?;
    }

    let address = config.server_address();
    let app_state = AppState {
        db_pool,
        credentials,
        tokens: Arc::new(JwtIssuer::new(&config.jwt)),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "listening");
    axum::serve(listener, app(app_state)).await?;
    Ok(())
}
