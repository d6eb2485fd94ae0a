//! Process configuration read from the environment (and `.env` via dotenvy).

use thiserror::Error;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub nats_url: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("environment variable {0} has an invalid value: {1:?}")]
    Invalid(&'static str, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty()).ok_or(ConfigError::Missing(key));
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parse_or(&lookup, "PORT", 8083)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_minutes: parse_or(&lookup, "JWT_TTL_MINUTES", 1440)?,
            nats_url: lookup("NATS_URL").filter(|v| !v.trim().is_empty()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| ConfigError::Invalid(key, raw)),
        _ => Ok(default),
    }
}
