//! Online store backend

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use online_store::auth::JwtKeys;
use online_store::events::EventPublisher;
use online_store::{app, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;

    let db = PgPoolOptions::new().max_connections(config.db_max_connections).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => { tracing::warn!(error = %e, "NATS unavailable, events stay in the activity log only"); None }
        },
        None => None,
    };
    let state = AppState::new(db, JwtKeys::new(&config.jwt_secret, config.jwt_ttl_minutes), EventPublisher::new(nats));

    tracing::info!(events = state.events.is_enabled(), "online-store listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app(state)).await?;
    Ok(())
}
