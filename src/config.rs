use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{anyhow, Context, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub token_ttl_hours: i64,
    pub request_timeout: Duration,
    pub image_api_url: String,
    pub image_bucket: String,
    pub image_api_key: Option<String>,
    pub image_public_url: String,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first if a
    /// `.env` file should be honoured.
    pub fn load() -> Result<Self> {
        let image_api_url: String = try_load("IMAGE_API_URL", "http://localhost:8004")?;
        let image_public_url = env::var("IMAGE_PUBLIC_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| image_api_url.clone());

        Ok(Self {
            host: try_load("HOST", "127.0.0.1")?,
            port: try_load("PORT", "3000")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_issuer: try_load("JWT_ISSUER", "matchpool")?,
            token_ttl_hours: try_load("TOKEN_TTL_HOURS", "24")?,
            request_timeout: Duration::from_secs(try_load("REQUEST_TIMEOUT_SECS", "10")?),
            image_api_url,
            image_bucket: try_load("IMAGE_BUCKET", "profile-images")?,
            image_api_key: env::var("IMAGE_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            image_public_url,
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow!("{key} must be set (environment or .env)"))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e: T::Err| anyhow!("{e}"))
        .with_context(|| format!("invalid {key} value: {raw}"))
}
