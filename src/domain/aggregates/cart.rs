//! Cart Aggregate
//!
//! A user's open (not yet checked out) order. At most one exists per user; lines are keyed by
//! inventory variant and accumulate on repeated additions.

use rust_decimal::Decimal;
use crate::domain::aggregates::order::{BillingDetails, CompletedOrder, OrderTotals, StockMove};
use crate::domain::pricing::PricingSettings;
use crate::domain::value_objects::{InvoiceNumber, Quantity};

#[derive(Clone, Debug, PartialEq)]
pub struct Cart {
    order_id: Option<i64>,
    user_id: i64,
    invoice_number: InvoiceNumber,
    total_item: Quantity,
    subtotal: Decimal,
    lines: Vec<CartLine>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    pub id: Option<i64>,
    pub inventory_id: i64,
    pub product_id: i64,
    pub price: Decimal,
    pub qty: Quantity,
    pub total: Decimal,
}

/// One add-to-cart request after product and variant resolution.
#[derive(Clone, Debug)]
pub struct CartAddition {
    pub product_id: i64,
    pub unit_price: Decimal,
    pub qty: Quantity,
    /// `None` when no variant matches the requested size and colour.
    pub inventory_id: Option<i64>,
}

impl CartAddition {
    pub fn amount(&self) -> Decimal { self.unit_price * self.qty.as_decimal() }
}

/// What happened to the line touched by [`Cart::add`].
#[derive(Clone, Debug, PartialEq)]
pub enum LineChange {
    Inserted(CartLine),
    Incremented(CartLine),
    /// The variant was not found; only the header totals moved.
    HeaderOnly,
}

impl Cart {
    pub fn open(user_id: i64, invoice_number: InvoiceNumber) -> Self {
        Self { order_id: None, user_id, invoice_number, total_item: Quantity::default(), subtotal: Decimal::ZERO, lines: vec![] }
    }

    pub fn restore(order_id: i64, user_id: i64, invoice_number: InvoiceNumber, total_item: Quantity, subtotal: Decimal, lines: Vec<CartLine>) -> Self {
        Self { order_id: Some(order_id), user_id, invoice_number, total_item, subtotal, lines }
    }

    pub fn order_id(&self) -> Option<i64> { self.order_id }
    pub fn user_id(&self) -> i64 { self.user_id }
    pub fn invoice_number(&self) -> &InvoiceNumber { &self.invoice_number }
    pub fn total_item(&self) -> Quantity { self.total_item }
    pub fn subtotal(&self) -> Decimal { self.subtotal }
    /// While the cart is open nothing but the subtotal is charged.
    pub fn total_paid(&self) -> Decimal { self.subtotal }
    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn is_persisted(&self) -> bool { self.order_id.is_some() }

    pub fn persisted(mut self, order_id: i64) -> Self { self.order_id = Some(order_id); self }

    pub fn add(&mut self, addition: &CartAddition) -> LineChange {
        let amount = addition.amount();
        self.total_item = self.total_item.add(addition.qty);
        self.subtotal += amount;

        let Some(inventory_id) = addition.inventory_id else { return LineChange::HeaderOnly };
        if let Some(existing) = self.lines.iter_mut().find(|l| l.inventory_id == inventory_id) {
            existing.qty = existing.qty.add(addition.qty);
            existing.total += amount;
            return LineChange::Incremented(existing.clone());
        }
        let line = CartLine { id: None, inventory_id, product_id: addition.product_id, price: addition.unit_price, qty: addition.qty, total: amount };
        self.lines.push(line.clone());
        LineChange::Inserted(line)
    }

    /// Closes the cart: prices it, lists the stock to withdraw and turns it into a completed order.
    pub fn checkout(self, payment_id: i64, pricing: &PricingSettings, billing: BillingDetails) -> Result<CompletedOrder, CartError> {
        let order_id = self.order_id.ok_or(CartError::NotPersisted)?;
        let quote = pricing.quote(self.subtotal);
        let stock_moves = self.lines.iter()
            .map(|l| StockMove { inventory_id: l.inventory_id, product_id: l.product_id, qty: l.qty })
            .collect();
        Ok(CompletedOrder {
            order_id,
            user_id: self.user_id,
            invoice_number: self.invoice_number,
            payment_id,
            totals: OrderTotals { total_item: self.total_item, quote },
            stock_moves,
            billing,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { NotPersisted }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "Cart has not been saved") }
}
