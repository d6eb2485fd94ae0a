use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use std::collections::BTreeMap;
use tracing::instrument;

use crate::domain::pricing::{PricingSettings, SettingsProvider, DISCOUNT_KEY, SHIPMENT_KEY, TAXES_KEY};
use crate::error::AppError;

pub async fn all(conn: &mut PgConnection) -> sqlx::Result<BTreeMap<String, String>> {
    let rows: Vec<(String, Option<String>)> = sqlx::query_as("SELECT key_name, key_value FROM settings ORDER BY key_name")
        .fetch_all(conn).await?;
    Ok(rows.into_iter().map(|(k, v)| (k, v.unwrap_or_default())).collect())
}

async fn values(conn: &mut PgConnection, keys: &[&str]) -> sqlx::Result<BTreeMap<String, String>> {
    let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    let rows: Vec<(String, Option<String>)> = sqlx::query_as("SELECT key_name, key_value FROM settings WHERE key_name = ANY($1)")
        .bind(&keys).fetch_all(conn).await?;
    Ok(rows.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))).collect())
}

/// Reads pricing settings from the `settings` table on every call.
#[derive(Clone, Debug)]
pub struct PgSettings { db: PgPool }

impl PgSettings {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl SettingsProvider for PgSettings {
    #[instrument(skip(self), err)]
    async fn pricing(&self) -> Result<PricingSettings, AppError> {
        let mut conn = self.db.acquire().await?;
        let raw = values(&mut conn, &[DISCOUNT_KEY, TAXES_KEY, SHIPMENT_KEY]).await?;
        PricingSettings::parse(
            raw.get(DISCOUNT_KEY).map(String::as_str),
            raw.get(TAXES_KEY).map(String::as_str),
            raw.get(SHIPMENT_KEY).map(String::as_str),
        )
    }
}
