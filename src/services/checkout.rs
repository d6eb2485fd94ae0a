//! Checkout preview and finalization.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::aggregates::{BillingDetails, StockMove};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::pricing::PriceQuote;
use crate::domain::value_objects::Quantity;
use crate::error::{AppError, Result};
use crate::store::models::{CartProduct, Order, Payment, User};
use crate::store::{activity, catalog, orders, users};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CheckoutPreview {
    pub order: Option<Order>,
    pub quote: PriceQuote,
    pub discount: Decimal,
    pub taxes: Decimal,
    pub shipment: Decimal,
    pub carts: Vec<CartProduct>,
    pub payments: Vec<Payment>,
    pub user: User,
}

/// Copies the quoted figures onto the order so it reads as it would after checkout.
fn priced(mut order: Order, quote: &PriceQuote) -> Order {
    order.total_discount = quote.discount;
    order.total_taxes = quote.taxes;
    order.total_shipment = quote.shipment;
    order.total_paid = quote.total_paid;
    order
}

/// Prices the open cart with the current settings without changing anything.
#[instrument(skip(state))]
pub async fn preview(state: &AppState, user_id: i64) -> Result<CheckoutPreview> {
    let pricing = state.settings.pricing().await?;
    let mut conn = state.db.acquire().await?;

    let user = users::find(&mut conn, user_id).await?.ok_or_else(|| AppError::not_found("User"))?;
    let order = orders::open_order(&mut conn, user_id).await?;
    let carts = match &order {
        Some(order) => orders::cart_products(&mut conn, order.id).await?,
        None => Vec::new(),
    };
    let payments = catalog::active_payments(&mut conn).await?;
    let quote = pricing.quote(order.as_ref().map(|o| o.subtotal).unwrap_or_default());

    Ok(CheckoutPreview {
        order: order.map(|o| priced(o, &quote)),
        quote,
        discount: pricing.discount.value(),
        taxes: pricing.taxes.value(),
        shipment: pricing.shipment,
        carts,
        payments,
        user,
    })
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutRequest {
    pub payment_id: i64,
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[validate(length(min = 1, message = "first_name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last_name is required"))]
    pub last_name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip_code: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[serde(default)]
    pub notes: String,
}

impl CheckoutRequest {
    fn billing(&self) -> BillingDetails {
        BillingDetails {
            email: self.email.trim().to_string(),
            phone: self.phone.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            country: self.country.clone(),
            city: self.city.clone(),
            zip_code: self.zip_code.clone(),
            address: self.address.clone(),
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: i64,
    pub invoice_number: String,
    pub total_item: u32,
    #[serde(flatten)]
    pub quote: PriceQuote,
}

/// Closes the user's open cart.
///
/// Stock is withdrawn per line and the whole checkout rolls back if any variant runs short.
/// Inventory rows are locked in id order so two checkouts sharing variants cannot deadlock.
#[instrument(skip(state, req), fields(payment_id = req.payment_id))]
pub async fn checkout(state: &AppState, user_id: i64, req: &CheckoutRequest) -> Result<CheckoutReceipt> {
    req.validate()?;
    let pricing = state.settings.pricing().await?;
    let mut tx = state.db.begin().await?;

    users::lock(&mut tx, user_id).await?.ok_or_else(|| AppError::not_found("User"))?;
    catalog::active_payment(&mut tx, req.payment_id).await?
        .ok_or_else(|| AppError::Validation("Payment method is not available".into()))?;
    let cart = orders::load_cart(&mut tx, user_id).await?
        .ok_or_else(|| AppError::NotFound("There is no open order to check out".into()))?;

    let completed = cart.checkout(req.payment_id, &pricing, req.billing())?;

    let mut moves: Vec<StockMove> = completed.stock_moves.clone();
    moves.sort_by_key(|m| m.inventory_id);
    for mv in &moves {
        let inventory = orders::lock_inventory(&mut tx, mv.inventory_id).await?
            .ok_or_else(|| AppError::not_found("Inventory"))?;
        let remaining = mv.apply(Quantity::from_db(inventory.stock))
            .ok_or(AppError::InsufficientStock(inventory.id))?;
        orders::set_stock(&mut tx, inventory.id, remaining).await?;
        orders::add_product_orders(&mut tx, mv.product_id, mv.qty).await?;
        catalog::remove_from_wishlist(&mut tx, user_id, mv.product_id).await?;
    }
    orders::complete(&mut tx, &completed).await?;

    let quote = completed.totals.quote;
    let event = DomainEvent::Order(OrderEvent::CheckedOut {
        user_id,
        order_id: completed.order_id,
        invoice_number: completed.invoice_number.to_string(),
        total_paid: quote.total_paid,
    });
    activity::record(&mut tx, &event).await?;
    tx.commit().await?;
    state.events.publish(&event).await;

    info!(order_id = completed.order_id, total_paid = %quote.total_paid, lines = moves.len(), "order checked out");
    Ok(CheckoutReceipt {
        order_id: completed.order_id,
        invoice_number: completed.invoice_number.into_inner(),
        total_item: completed.totals.total_item.value(),
        quote,
    })
}
