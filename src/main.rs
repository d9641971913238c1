use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use matchpool::config::Config;
use matchpool::services::auth_service::TokenService;
use matchpool::services::blob_store::HttpBlobStore;
use matchpool::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load()?;

    info!(build = env!("MATCHPOOL_BUILD_ID"), "starting matchpool");

    let connect_options: SqliteConnectOptions = config
        .database_url
        .parse()
        .with_context(|| format!("invalid DATABASE_URL: {}", config.database_url))?;
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options.create_if_missing(true))
        .await
        .context("cannot connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("migrations failed")?;

    let state = AppState {
        pool,
        tokens: TokenService::new(
            &config.jwt_secret,
            config.jwt_issuer.clone(),
            config.token_ttl_hours,
        ),
        blobs: Arc::new(HttpBlobStore::new(
            config.image_api_url.clone(),
            config.image_public_url.clone(),
            config.image_bucket.clone(),
            config.image_api_key.clone(),
        )),
    };
    let app = web::router(state, config.request_timeout);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("cannot parse HOST/PORT")?;

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            let fallback: SocketAddr = format!("{}:{}", config.host, config.port.saturating_add(1))
                .parse()
                .context("cannot parse fallback address")?;
            warn!(%addr, %fallback, error = %e, "bind failed, trying fallback port");
            tokio::net::TcpListener::bind(fallback)
                .await
                .context("cannot bind fallback port")?
        }
    };

    info!(addr = %listener.local_addr()?, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
