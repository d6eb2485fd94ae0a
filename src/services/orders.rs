//! Order history, detail, cancellation and the cart session view.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::Percentage;
use crate::error::{AppError, Result};
use crate::store::models::{CartProduct, Order, OrderBilling, Payment, WishlistProduct};
use crate::store::orders::{self, ORDER_SORT_COLUMNS};
use crate::store::{activity, catalog, sort_column, Page, SortDir};
use crate::AppState;

pub const ORDER_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderList {
    pub list: Vec<Order>,
    pub total_all: i64,
    pub total_filtered: i64,
    pub limit: i64,
    pub page: i64,
}

#[instrument(skip(state))]
pub async fn list(state: &AppState, user_id: i64, query: &OrderListQuery) -> Result<OrderList> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let sort = sort_column(query.order_by.as_deref(), ORDER_SORT_COLUMNS, "id");
    let dir = SortDir::parse(query.order_dir.as_deref());
    let page = Page::new(query.page, query.limit, ORDER_PAGE_SIZE);

    let mut conn = state.db.acquire().await?;
    let total_all = orders::count_for_user(&mut conn, user_id, None).await?;
    let total_filtered = match search {
        Some(_) => orders::count_for_user(&mut conn, user_id, search).await?,
        None => total_all,
    };
    let list = orders::list_for_user(&mut conn, user_id, search, sort, dir, page).await?;
    Ok(OrderList { list, total_all, total_filtered, limit: page.limit, page: page.page })
}

#[derive(Debug, Serialize)]
pub struct OrderDetailView {
    pub order: Order,
    pub billings: Vec<OrderBilling>,
    pub payment: Option<Payment>,
    pub carts: Vec<CartProduct>,
    /// Discount as a percentage of the subtotal.
    pub discount: Decimal,
    pub taxes: Decimal,
    pub shipment: Decimal,
}

#[instrument(skip(state))]
pub async fn detail(state: &AppState, user_id: i64, order_id: i64) -> Result<OrderDetailView> {
    let mut conn = state.db.acquire().await?;
    let order = orders::find_for_user(&mut conn, user_id, order_id).await?.ok_or_else(|| AppError::not_found("Order"))?;
    let payment = match order.payment_id {
        Some(id) => catalog::active_payment(&mut conn, id).await?,
        None => None,
    };
    let billings = orders::billings(&mut conn, order.id).await?;
    let carts = orders::cart_products(&mut conn, order.id).await?;

    Ok(OrderDetailView {
        discount: Percentage::ratio(order.total_discount, order.subtotal).value(),
        taxes: Percentage::ratio(order.total_taxes, order.subtotal).value(),
        shipment: order.total_shipment,
        order,
        billings,
        payment,
        carts,
    })
}

/// Hard-deletes one of the user's orders together with everything that references it.
/// Inventory and product counters are left untouched.
#[instrument(skip(state))]
pub async fn cancel(state: &AppState, user_id: i64, order_id: i64) -> Result<()> {
    let mut tx = state.db.begin().await?;
    let order = orders::find_for_user(&mut tx, user_id, order_id).await?.ok_or_else(|| AppError::not_found("Order"))?;
    orders::delete(&mut tx, order.id).await?;

    let event = DomainEvent::Order(OrderEvent::Cancelled { user_id, order_id: order.id });
    activity::record(&mut tx, &event).await?;
    tx.commit().await?;
    state.events.publish(&event).await;

    info!(invoice_number = %order.invoice_number, "order cancelled");
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub order: Option<Order>,
    pub carts: Vec<CartProduct>,
    pub wishlists: Vec<WishlistProduct>,
}

pub async fn session(state: &AppState, user_id: i64) -> Result<SessionView> {
    let mut conn = state.db.acquire().await?;
    let order = orders::open_order(&mut conn, user_id).await?;
    let carts = match &order {
        Some(order) => orders::cart_products(&mut conn, order.id).await?,
        None => Vec::new(),
    };
    let wishlists = catalog::wishlist(&mut conn, user_id).await?;
    Ok(SessionView { order, carts, wishlists })
}
