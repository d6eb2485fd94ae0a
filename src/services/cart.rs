//! Add-to-cart: accumulates a product variant into the user's open order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::aggregates::{Cart, CartAddition, LineChange};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{InvoiceNumber, Quantity};
use crate::error::{AppError, Result};
use crate::store::{activity, catalog, orders, users};
use crate::AppState;

pub const MAX_QTY_PER_ADD: u32 = 1000;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub size_id: i64,
    pub colour_id: i64,
    #[validate(range(min = 1, max = 1000, message = "qty must be between 1 and 1000"))]
    pub qty: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub order_id: i64,
    pub invoice_number: String,
    pub total_item: u32,
    pub subtotal: Decimal,
    pub total_paid: Decimal,
    /// False when no inventory variant matched the requested size and colour.
    pub line_recorded: bool,
}

/// Adds `qty` of the product variant to the user's cart, opening the cart if needed.
///
/// Runs in one transaction with the user row locked, so concurrent additions for the same
/// user are applied one after the other. A missing variant is not an error: the cart header
/// totals still move and no line is written.
#[instrument(skip(state, req), fields(qty = req.qty))]
pub async fn add_to_cart(state: &AppState, user_id: i64, product_id: i64, req: &AddToCartRequest) -> Result<CartSummary> {
    req.validate()?;
    let mut tx = state.db.begin().await?;

    users::lock(&mut tx, user_id).await?.ok_or_else(|| AppError::not_found("User"))?;
    let product = catalog::published_product(&mut tx, product_id).await?.ok_or_else(|| AppError::not_found("Product"))?;
    let variant = catalog::find_variant(&mut tx, product_id, req.size_id, req.colour_id).await?;

    let mut cart = match orders::load_cart(&mut tx, user_id).await? {
        Some(cart) => cart,
        None => Cart::open(user_id, InvoiceNumber::generate(orders::next_invoice_seq(&mut tx).await?)),
    };
    let addition = CartAddition {
        product_id,
        unit_price: product.price,
        qty: Quantity::new(req.qty),
        inventory_id: variant.as_ref().map(|v| v.id),
    };
    let change = cart.add(&addition);

    let payment_id = if cart.is_persisted() { None } else { catalog::default_payment(&mut tx).await?.map(|p| p.id) };
    let order_id = orders::save_cart_header(&mut tx, &cart, payment_id).await?;
    let cart = cart.persisted(order_id);

    let line_recorded = match &change {
        LineChange::Inserted(line) | LineChange::Incremented(line) => {
            orders::save_cart_line(&mut tx, order_id, line).await?;
            true
        }
        LineChange::HeaderOnly => {
            warn!(product_id, size_id = req.size_id, colour_id = req.colour_id, "no inventory variant, cart header updated only");
            false
        }
    };
    orders::touch_cart_product(&mut tx, order_id, product_id).await?;

    let event = DomainEvent::Order(OrderEvent::CartUpdated { user_id, order_id, product_id, product_name: product.name.clone(), qty: req.qty });
    activity::record(&mut tx, &event).await?;
    tx.commit().await?;
    state.events.publish(&event).await;

    info!(order_id, subtotal = %cart.subtotal(), "cart updated");
    Ok(CartSummary {
        order_id,
        invoice_number: cart.invoice_number().to_string(),
        total_item: cart.total_item().value(),
        subtotal: cart.subtotal(),
        total_paid: cart.total_paid(),
        line_recorded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qty_bounds() {
        let ok = AddToCartRequest { size_id: 1, colour_id: 1, qty: 1 };
        assert!(ok.validate().is_ok());
        let zero = AddToCartRequest { qty: 0, ..ok.clone() };
        assert!(zero.validate().is_err());
        let huge = AddToCartRequest { qty: MAX_QTY_PER_ADD + 1, ..ok };
        assert!(huge.validate().is_err());
    }
}
