//! Checkout pricing: discount, taxes and flat shipment applied to a cart subtotal.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use crate::domain::value_objects::Percentage;
use crate::error::AppError;

pub const DISCOUNT_KEY: &str = "discount_value";
pub const TAXES_KEY: &str = "taxes_value";
pub const SHIPMENT_KEY: &str = "total_shipment";

/// Pricing parameters stored as string settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PricingSettings {
    pub discount: Percentage,
    pub taxes: Percentage,
    pub shipment: Decimal,
}

impl PricingSettings {
    /// Parses the raw setting values. Missing or malformed values are a configuration error.
    pub fn parse(discount: Option<&str>, taxes: Option<&str>, shipment: Option<&str>) -> Result<Self, AppError> {
        Ok(Self {
            discount: parse_setting(DISCOUNT_KEY, discount)?,
            taxes: parse_setting(TAXES_KEY, taxes)?,
            shipment: parse_setting::<Decimal>(SHIPMENT_KEY, shipment)?,
        })
    }

    pub fn quote(&self, subtotal: Decimal) -> PriceQuote {
        let discount = self.discount.of(subtotal);
        let taxes = self.taxes.of(subtotal);
        PriceQuote {
            subtotal,
            discount,
            taxes,
            shipment: self.shipment,
            total_paid: subtotal + taxes + self.shipment - discount,
        }
    }
}

fn parse_setting<T: FromStr>(key: &str, raw: Option<&str>) -> Result<T, AppError> {
    let raw = raw.ok_or_else(|| AppError::Config(format!("setting {key} is missing")))?;
    raw.trim().parse().map_err(|_| AppError::Config(format!("setting {key} is not a number: {raw:?}")))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub taxes: Decimal,
    pub shipment: Decimal,
    pub total_paid: Decimal,
}

/// Source of pricing settings. Implementations are expected to return current values on every call.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn pricing(&self) -> Result<PricingSettings, AppError>;
}

/// Provider returning the same settings every time.
#[derive(Clone, Copy, Debug)]
pub struct FixedSettings(pub PricingSettings);

#[async_trait]
impl SettingsProvider for FixedSettings {
    async fn pricing(&self) -> Result<PricingSettings, AppError> { Ok(self.0) }
}
