use sqlx::{PgConnection, Postgres, QueryBuilder};

use crate::domain::aggregates::{Cart, CartLine, CompletedOrder, OrderStatus};
use crate::domain::value_objects::{InvoiceNumber, Quantity};
use crate::store::models::{CartProduct, Inventory, Order, OrderBilling, OrderDetail};
use crate::store::{like_pattern, Page, SortDir};

const ORDER_COLUMNS: &str = "id, user_id, payment_id, invoice_number, total_item, subtotal, total_discount, total_taxes, total_shipment, total_paid, status, created_at, updated_at";

pub const ORDER_SORT_COLUMNS: &[&str] = &["id", "invoice_number", "total_item", "subtotal", "total_paid", "status", "created_at"];

pub async fn open_order(conn: &mut PgConnection, user_id: i64) -> sqlx::Result<Option<Order>> {
    sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 AND status = $2"))
        .bind(user_id).bind(OrderStatus::Open.code()).fetch_optional(conn).await
}

pub async fn details(conn: &mut PgConnection, order_id: i64) -> sqlx::Result<Vec<OrderDetail>> {
    sqlx::query_as::<_, OrderDetail>(
        "SELECT orders_details.id, orders_details.order_id, orders_details.inventory_id, products_inventories.product_id, orders_details.price, orders_details.qty, orders_details.total FROM orders_details INNER JOIN products_inventories ON products_inventories.id = orders_details.inventory_id WHERE orders_details.order_id = $1 ORDER BY orders_details.id",
    )
    .bind(order_id).fetch_all(conn).await
}

/// Loads the user's cart aggregate, if an open order exists.
pub async fn load_cart(conn: &mut PgConnection, user_id: i64) -> sqlx::Result<Option<Cart>> {
    let Some(order) = open_order(&mut *conn, user_id).await? else { return Ok(None) };
    let lines = details(&mut *conn, order.id).await?
        .into_iter()
        .map(|d| CartLine { id: Some(d.id), inventory_id: d.inventory_id, product_id: d.product_id, price: d.price, qty: Quantity::from_db(d.qty), total: d.total })
        .collect();
    Ok(Some(Cart::restore(order.id, order.user_id, InvoiceNumber::from_existing(order.invoice_number), Quantity::from_db(order.total_item), order.subtotal, lines)))
}

pub async fn next_invoice_seq(conn: &mut PgConnection) -> sqlx::Result<i64> {
    let (seq,): (i64,) = sqlx::query_as("SELECT nextval('invoice_seq')").fetch_one(conn).await?;
    Ok(seq)
}

/// Writes the cart header, inserting the order row on first save. Returns the order id.
pub async fn save_cart_header(conn: &mut PgConnection, cart: &Cart, payment_id: Option<i64>) -> sqlx::Result<i64> {
    match cart.order_id() {
        Some(order_id) => {
            sqlx::query("UPDATE orders SET total_item = $2, subtotal = $3, total_paid = $4, updated_at = NOW() WHERE id = $1")
                .bind(order_id).bind(cart.total_item().to_db()).bind(cart.subtotal()).bind(cart.total_paid())
                .execute(conn).await?;
            Ok(order_id)
        }
        None => {
            let (id,): (i64,) = sqlx::query_as(
                "INSERT INTO orders (user_id, payment_id, invoice_number, total_item, subtotal, total_paid, status) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
            )
            .bind(cart.user_id()).bind(payment_id).bind(cart.invoice_number().as_str())
            .bind(cart.total_item().to_db()).bind(cart.subtotal()).bind(cart.total_paid()).bind(OrderStatus::Open.code())
            .fetch_one(conn).await?;
            Ok(id)
        }
    }
}

/// Inserts or overwrites the line for `(order, inventory)`.
pub async fn save_cart_line(conn: &mut PgConnection, order_id: i64, line: &CartLine) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO orders_details (order_id, inventory_id, price, qty, total, status) VALUES ($1, $2, $3, $4, $5, 1) ON CONFLICT (order_id, inventory_id) DO UPDATE SET qty = EXCLUDED.qty, total = EXCLUDED.total",
    )
    .bind(order_id).bind(line.inventory_id).bind(line.price).bind(line.qty.to_db()).bind(line.total)
    .execute(conn).await?;
    Ok(())
}

/// Replaces the `(order, product)` cart join row.
pub async fn touch_cart_product(conn: &mut PgConnection, order_id: i64, product_id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM orders_carts WHERE order_id = $1 AND product_id = $2")
        .bind(order_id).bind(product_id).execute(&mut *conn).await?;
    sqlx::query("INSERT INTO orders_carts (order_id, product_id) VALUES ($1, $2)")
        .bind(order_id).bind(product_id).execute(conn).await?;
    Ok(())
}

pub async fn lock_inventory(conn: &mut PgConnection, inventory_id: i64) -> sqlx::Result<Option<Inventory>> {
    sqlx::query_as::<_, Inventory>("SELECT id, product_id, size_id, colour_id, stock FROM products_inventories WHERE id = $1 FOR UPDATE")
        .bind(inventory_id).fetch_optional(conn).await
}

pub async fn set_stock(conn: &mut PgConnection, inventory_id: i64, stock: Quantity) -> sqlx::Result<()> {
    sqlx::query("UPDATE products_inventories SET stock = $2 WHERE id = $1")
        .bind(inventory_id).bind(stock.to_db()).execute(conn).await?;
    Ok(())
}

pub async fn add_product_orders(conn: &mut PgConnection, product_id: i64, qty: Quantity) -> sqlx::Result<()> {
    sqlx::query("UPDATE products SET total_order = total_order + $2, updated_at = NOW() WHERE id = $1")
        .bind(product_id).bind(qty.to_db()).execute(conn).await?;
    Ok(())
}

/// Persists the closed order header and its billing rows, and empties the cart join.
pub async fn complete(conn: &mut PgConnection, order: &CompletedOrder) -> sqlx::Result<()> {
    let quote = &order.totals.quote;
    sqlx::query(
        "UPDATE orders SET status = $2, payment_id = $3, total_item = $4, subtotal = $5, total_discount = $6, total_taxes = $7, total_shipment = $8, total_paid = $9, updated_at = NOW() WHERE id = $1",
    )
    .bind(order.order_id).bind(order.status().code()).bind(order.payment_id).bind(order.totals.total_item.to_db())
    .bind(quote.subtotal).bind(quote.discount).bind(quote.taxes).bind(quote.shipment).bind(quote.total_paid)
    .execute(&mut *conn).await?;

    let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO orders_billings (order_id, name, description, status) ");
    qb.push_values(order.billing.rows(), |mut row, (name, value)| {
        row.push_bind(order.order_id).push_bind(name).push_bind(value.to_string()).push_bind(1_i16);
    });
    qb.build().execute(&mut *conn).await?;

    sqlx::query("DELETE FROM orders_carts WHERE order_id = $1").bind(order.order_id).execute(conn).await?;
    Ok(())
}

pub async fn find_for_user(conn: &mut PgConnection, user_id: i64, order_id: i64) -> sqlx::Result<Option<Order>> {
    sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"))
        .bind(order_id).bind(user_id).fetch_optional(conn).await
}

/// Hard-deletes the order together with its lines, billing rows and cart join rows.
pub async fn delete(conn: &mut PgConnection, order_id: i64) -> sqlx::Result<()> {
    for table in ["orders_details", "orders_carts", "orders_billings"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE order_id = $1")).bind(order_id).execute(&mut *conn).await?;
    }
    sqlx::query("DELETE FROM orders WHERE id = $1").bind(order_id).execute(conn).await?;
    Ok(())
}

pub async fn billings(conn: &mut PgConnection, order_id: i64) -> sqlx::Result<Vec<OrderBilling>> {
    sqlx::query_as::<_, OrderBilling>("SELECT id, order_id, name, description FROM orders_billings WHERE order_id = $1 ORDER BY name ASC")
        .bind(order_id).fetch_all(conn).await
}

pub async fn cart_products(conn: &mut PgConnection, order_id: i64) -> sqlx::Result<Vec<CartProduct>> {
    sqlx::query_as::<_, CartProduct>(
        "SELECT products.id, products.image, products.name, products.price, orders_details.qty, orders_details.total FROM orders_details INNER JOIN products_inventories ON products_inventories.id = orders_details.inventory_id INNER JOIN products ON products.id = products_inventories.product_id WHERE orders_details.order_id = $1 ORDER BY orders_details.id",
    )
    .bind(order_id).fetch_all(conn).await
}

pub async fn count_for_user(conn: &mut PgConnection, user_id: i64, search: Option<&str>) -> sqlx::Result<i64> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1 AND ($2::TEXT IS NULL OR invoice_number LIKE $2)")
        .bind(user_id).bind(search.map(like_pattern)).fetch_one(conn).await?;
    Ok(total)
}

/// `sort` must come from [`ORDER_SORT_COLUMNS`].
pub async fn list_for_user(conn: &mut PgConnection, user_id: i64, search: Option<&str>, sort: &'static str, dir: SortDir, page: Page) -> sqlx::Result<Vec<Order>> {
    sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 AND ($2::TEXT IS NULL OR invoice_number LIKE $2) ORDER BY {sort} {}, id DESC LIMIT $3 OFFSET $4",
        dir.as_sql()
    ))
    .bind(user_id).bind(search.map(like_pattern)).bind(page.limit).bind(page.offset())
    .fetch_all(conn).await
}
