//! Order Aggregate

use serde::{Deserialize, Serialize};
use crate::domain::pricing::PriceQuote;
use crate::domain::value_objects::{InvoiceNumber, Quantity};

/// Lifecycle of an order row. An open order is the user's cart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus { #[default] Open, Completed }

impl OrderStatus {
    pub fn code(&self) -> i16 { match self { Self::Open => 0, Self::Completed => 1 } }
    pub fn from_code(code: i16) -> Option<Self> {
        match code { 0 => Some(Self::Open), 1 => Some(Self::Completed), _ => None }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderTotals { pub total_item: Quantity, pub quote: PriceQuote }

/// Stock withdrawn from one inventory variant at checkout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StockMove { pub inventory_id: i64, pub product_id: i64, pub qty: Quantity }

impl StockMove {
    /// Remaining stock after the withdrawal, or `None` if there is not enough.
    pub fn apply(&self, stock: Quantity) -> Option<Quantity> { stock.subtract(self.qty) }
}

/// Billing fields captured at checkout, stored as one row per field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub city: String,
    pub zip_code: String,
    pub address: String,
    pub notes: String,
}

impl BillingDetails {
    pub fn rows(&self) -> [(&'static str, &str); 9] {
        [
            ("email", &self.email),
            ("phone", &self.phone),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("country", &self.country),
            ("city", &self.city),
            ("zip_code", &self.zip_code),
            ("address", &self.address),
            ("notes", &self.notes),
        ]
    }
}

/// A checked-out cart, ready to be persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletedOrder {
    pub order_id: i64,
    pub user_id: i64,
    pub invoice_number: InvoiceNumber,
    pub payment_id: i64,
    pub totals: OrderTotals,
    pub stock_moves: Vec<StockMove>,
    pub billing: BillingDetails,
}

impl CompletedOrder {
    pub fn status(&self) -> OrderStatus { OrderStatus::Completed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(OrderStatus::Open.code(), 0);
        assert_eq!(OrderStatus::from_code(1), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::from_code(5), None);
    }

    #[test]
    fn test_stock_move_decrements() {
        let mv = StockMove { inventory_id: 1, product_id: 1, qty: Quantity::new(3) };
        assert_eq!(mv.apply(Quantity::new(50)), Some(Quantity::new(47)));
        assert_eq!(mv.apply(Quantity::new(2)), None);
    }

    #[test]
    fn test_billing_rows_cover_every_field() {
        let billing = BillingDetails { email: "a@b.c".into(), notes: "ring twice".into(), ..Default::default() };
        let rows = billing.rows();
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0], ("email", "a@b.c"));
        assert_eq!(rows[8], ("notes", "ring twice"));
    }
}
