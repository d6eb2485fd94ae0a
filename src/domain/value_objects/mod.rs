//! Value Objects for the store

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quantity value object
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self { Self(value) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: Quantity) -> Self { Self(self.0.saturating_add(other.0)) }
    pub fn subtract(&self, other: Quantity) -> Option<Self> {
        if other.0 > self.0 { None } else { Some(Self(self.0 - other.0)) }
    }
    pub fn as_decimal(&self) -> Decimal { Decimal::from(self.0) }

    /// Reads a non-negative database counter.
    pub fn from_db(value: i32) -> Self { Self(value.max(0) as u32) }
    pub fn to_db(&self) -> i32 { i32::try_from(self.0).unwrap_or(i32::MAX) }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Percentage read from a string-encoded setting, e.g. `"10"` for ten percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Percentage(Decimal);

impl Percentage {
    pub fn new(value: Decimal) -> Self { Self(value) }
    pub fn value(&self) -> Decimal { self.0 }
    pub fn of(&self, amount: Decimal) -> Decimal { amount * (self.0 / Decimal::ONE_HUNDRED) }

    /// `part` expressed as a percentage of `whole`; zero when `whole` is zero.
    pub fn ratio(part: Decimal, whole: Decimal) -> Self {
        if whole.is_zero() { Self(Decimal::ZERO) } else { Self(part / whole * Decimal::ONE_HUNDRED) }
    }
}

impl FromStr for Percentage {
    type Err = rust_decimal::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Decimal::from_str(s.trim()).map(Self) }
}

/// Invoice number assigned when a cart is opened: a wall-clock tick followed by a
/// database sequence value. The sequence keeps numbers distinct within one tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    pub fn at(now: DateTime<Utc>, seq: i64) -> Self { Self(format!("{}-{seq}", now.timestamp_micros())) }
    pub fn generate(seq: i64) -> Self { Self::at(Utc::now(), seq) }
    pub fn from_existing(value: String) -> Self { Self(value) }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quantity_subtract() {
        let stock = Quantity::new(50);
        assert_eq!(stock.subtract(Quantity::new(3)), Some(Quantity::new(47)));
        assert_eq!(stock.subtract(Quantity::new(51)), None);
    }

    #[test]
    fn test_quantity_from_db_clamps_negative() {
        assert_eq!(Quantity::from_db(-4), Quantity::new(0));
        assert_eq!(Quantity::new(7).to_db(), 7);
    }

    #[test]
    fn test_percentage_parse_and_apply() {
        let pct: Percentage = " 10 ".parse().unwrap();
        assert_eq!(pct.of(dec!(200)), dec!(20));
        assert!("ten".parse::<Percentage>().is_err());
    }

    #[test]
    fn test_percentage_ratio_zero_whole() {
        assert_eq!(Percentage::ratio(dec!(10), Decimal::ZERO).value(), Decimal::ZERO);
        assert_eq!(Percentage::ratio(dec!(10), dec!(200)).value(), dec!(5));
    }

    #[test]
    fn test_invoice_number_grows_with_time() {
        let tick = |n: &InvoiceNumber| n.as_str().split('-').next().unwrap().parse::<i64>().unwrap();
        let a = InvoiceNumber::at(Utc.timestamp_opt(1_700_000_000, 0).unwrap(), 1);
        let b = InvoiceNumber::at(Utc.timestamp_opt(1_700_000_001, 0).unwrap(), 2);
        assert!(tick(&a) < tick(&b));
    }

    #[test]
    fn test_invoice_number_distinct_within_one_tick() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_ne!(InvoiceNumber::at(now, 41), InvoiceNumber::at(now, 42));
        assert_eq!(InvoiceNumber::at(now, 42).as_str(), "1700000000000000-42");
    }
}
