//! End-to-end cart, checkout and cancel flows against PostgreSQL.
//!
//! Run with `DATABASE_URL=... cargo test --features db-tests`.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use uuid::Uuid;

use online_store::error::AppError;
use online_store::services::cart::{add_to_cart, AddToCartRequest};
use online_store::services::checkout::{checkout, CheckoutRequest};
use online_store::services::auth::{login, LoginRequest};
use online_store::services::orders::{self, OrderListQuery};
use online_store::AppState;

struct Fixture {
    user_id: i64,
    product_id: i64,
    size_id: i64,
    colour_id: i64,
    inventory_id: i64,
    payment_id: i64,
}

async fn fixture(db: &PgPool, price: Decimal, stock: i32) -> Fixture {
    let tag = Uuid::new_v4().simple().to_string();
    let (user_id,): (i64,) = sqlx::query_as("INSERT INTO users (email, password, first_name, status) VALUES ($1, 'x', 'Test', 1) RETURNING id")
        .bind(format!("{tag}@example.com")).fetch_one(db).await.unwrap();
    let (brand_id,): (i64,) = sqlx::query_as("INSERT INTO brands (name, status) VALUES ($1, 1) RETURNING id")
        .bind(format!("brand-{tag}")).fetch_one(db).await.unwrap();
    let (product_id,): (i64,) = sqlx::query_as(
        "INSERT INTO products (brand_id, sku, name, price, status, published_at) VALUES ($1, $2, $3, $4, 1, NOW() - INTERVAL '1 day') RETURNING id",
    )
    .bind(brand_id).bind(format!("SKU-{tag}")).bind(format!("Shirt {tag}")).bind(price)
    .fetch_one(db).await.unwrap();
    let (size_id,): (i64,) = sqlx::query_as("INSERT INTO sizes (name, status) VALUES ('M', 1) RETURNING id").fetch_one(db).await.unwrap();
    let (colour_id,): (i64,) = sqlx::query_as("INSERT INTO colours (code, name, status) VALUES ('#000', 'Black', 1) RETURNING id").fetch_one(db).await.unwrap();
    let (inventory_id,): (i64,) = sqlx::query_as("INSERT INTO products_inventories (product_id, size_id, colour_id, stock, status) VALUES ($1, $2, $3, $4, 1) RETURNING id")
        .bind(product_id).bind(size_id).bind(colour_id).bind(stock).fetch_one(db).await.unwrap();
    let (payment_id,): (i64,) = sqlx::query_as("INSERT INTO payments (name, status) VALUES ('Bank transfer', 1) RETURNING id").fetch_one(db).await.unwrap();
    Fixture { user_id, product_id, size_id, colour_id, inventory_id, payment_id }
}

fn add(f: &Fixture, qty: u32) -> AddToCartRequest {
    AddToCartRequest { size_id: f.size_id, colour_id: f.colour_id, qty }
}

fn billing(f: &Fixture) -> CheckoutRequest {
    CheckoutRequest {
        payment_id: f.payment_id,
        email: "shopper@example.com".into(),
        phone: "0800".into(),
        first_name: "Test".into(),
        last_name: "Shopper".into(),
        country: "ID".into(),
        city: "Bandung".into(),
        zip_code: "40111".into(),
        address: "Jl. Asia Afrika 8".into(),
        notes: String::new(),
    }
}

async fn setup(price: Decimal, stock: i32) -> (AppState, Fixture) {
    let db = common::database().await;
    let f = fixture(&db, price, stock).await;
    (common::state(db), f)
}

async fn open_orders(db: &PgPool, user_id: i64) -> i64 {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1 AND status = 0").bind(user_id).fetch_one(db).await.unwrap();
    n
}

async fn stock(db: &PgPool, inventory_id: i64) -> i32 {
    let (n,): (i32,) = sqlx::query_as("SELECT stock FROM products_inventories WHERE id = $1").bind(inventory_id).fetch_one(db).await.unwrap();
    n
}

#[tokio::test]
#[cfg_attr(not(feature = "db-tests"), ignore)]
async fn test_repeated_adds_accumulate_on_one_line() {
    let (state, f) = setup(dec!(100), 50).await;

    add_to_cart(&state, f.user_id, f.product_id, &add(&f, 1)).await.unwrap();
    let summary = add_to_cart(&state, f.user_id, f.product_id, &add(&f, 1)).await.unwrap();

    assert_eq!(summary.total_item, 2);
    assert_eq!(summary.subtotal, dec!(200));
    assert_eq!(summary.total_paid, dec!(200));

    let lines: Vec<(i32, Decimal)> = sqlx::query_as("SELECT qty, total FROM orders_details WHERE order_id = $1")
        .bind(summary.order_id).fetch_all(&state.db).await.unwrap();
    assert_eq!(lines, vec![(2, dec!(200))]);
    assert_eq!(open_orders(&state.db, f.user_id).await, 1);
}

#[tokio::test]
#[cfg_attr(not(feature = "db-tests"), ignore)]
async fn test_concurrent_adds_keep_a_single_open_order() {
    let (state, f) = setup(dec!(10), 50).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let state = state.clone();
        let req = add(&f, 1);
        let (user_id, product_id) = (f.user_id, f.product_id);
        handles.push(tokio::spawn(async move { add_to_cart(&state, user_id, product_id, &req).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(open_orders(&state.db, f.user_id).await, 1);
    let (qty, subtotal): (i32, Decimal) = sqlx::query_as("SELECT total_item, subtotal FROM orders WHERE user_id = $1 AND status = 0")
        .bind(f.user_id).fetch_one(&state.db).await.unwrap();
    assert_eq!(qty, 8);
    assert_eq!(subtotal, dec!(80));
}

#[tokio::test]
#[cfg_attr(not(feature = "db-tests"), ignore)]
async fn test_checkout_prices_and_withdraws_stock() {
    let (state, f) = setup(dec!(200), 50).await;
    add_to_cart(&state, f.user_id, f.product_id, &add(&f, 1)).await.unwrap();
    sqlx::query("INSERT INTO products_wishlists (user_id, product_id) VALUES ($1, $2)").bind(f.user_id).bind(f.product_id).execute(&state.db).await.unwrap();

    let receipt = checkout(&state, f.user_id, &billing(&f)).await.unwrap();
    assert_eq!(receipt.quote.discount, dec!(10));
    assert_eq!(receipt.quote.taxes, dec!(20));
    assert_eq!(receipt.quote.total_paid, dec!(260));

    assert_eq!(stock(&state.db, f.inventory_id).await, 49);
    let (total_order,): (i32,) = sqlx::query_as("SELECT total_order FROM products WHERE id = $1").bind(f.product_id).fetch_one(&state.db).await.unwrap();
    assert_eq!(total_order, 1);

    let (status, total_paid): (i16, Decimal) = sqlx::query_as("SELECT status, total_paid FROM orders WHERE id = $1").bind(receipt.order_id).fetch_one(&state.db).await.unwrap();
    assert_eq!(status, 1);
    assert_eq!(total_paid, dec!(260));

    let (billings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders_billings WHERE order_id = $1").bind(receipt.order_id).fetch_one(&state.db).await.unwrap();
    assert_eq!(billings, 9);
    let (wished,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products_wishlists WHERE user_id = $1").bind(f.user_id).fetch_one(&state.db).await.unwrap();
    assert_eq!(wished, 0);
    assert_eq!(open_orders(&state.db, f.user_id).await, 0);
}

#[tokio::test]
#[cfg_attr(not(feature = "db-tests"), ignore)]
async fn test_checkout_decrements_stock_by_line_qty() {
    let (state, f) = setup(dec!(15), 50).await;
    add_to_cart(&state, f.user_id, f.product_id, &add(&f, 3)).await.unwrap();
    checkout(&state, f.user_id, &billing(&f)).await.unwrap();
    assert_eq!(stock(&state.db, f.inventory_id).await, 47);
}

#[tokio::test]
#[cfg_attr(not(feature = "db-tests"), ignore)]
async fn test_insufficient_stock_rolls_back_checkout() {
    let (state, f) = setup(dec!(15), 2).await;
    add_to_cart(&state, f.user_id, f.product_id, &add(&f, 3)).await.unwrap();

    let err = checkout(&state, f.user_id, &billing(&f)).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(id) if id == f.inventory_id));

    assert_eq!(stock(&state.db, f.inventory_id).await, 2);
    assert_eq!(open_orders(&state.db, f.user_id).await, 1);
    let (total_order,): (i32,) = sqlx::query_as("SELECT total_order FROM products WHERE id = $1").bind(f.product_id).fetch_one(&state.db).await.unwrap();
    assert_eq!(total_order, 0);
}

#[tokio::test]
#[cfg_attr(not(feature = "db-tests"), ignore)]
async fn test_checkout_without_cart_is_not_found() {
    let (state, f) = setup(dec!(15), 5).await;
    let err = checkout(&state, f.user_id, &billing(&f)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[cfg_attr(not(feature = "db-tests"), ignore)]
async fn test_cancel_removes_all_traces() {
    let (state, f) = setup(dec!(30), 10).await;
    let summary = add_to_cart(&state, f.user_id, f.product_id, &add(&f, 2)).await.unwrap();
    checkout(&state, f.user_id, &billing(&f)).await.unwrap();

    let (lines,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders_details WHERE order_id = $1").bind(summary.order_id).fetch_one(&state.db).await.unwrap();
    assert_eq!(lines, 1);
    let (billings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders_billings WHERE order_id = $1").bind(summary.order_id).fetch_one(&state.db).await.unwrap();
    assert_eq!(billings, 9);

    orders::cancel(&state, f.user_id, summary.order_id).await.unwrap();

    for table in ["orders_details", "orders_billings", "orders_carts"] {
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table} WHERE order_id = $1"))
            .bind(summary.order_id).fetch_one(&state.db).await.unwrap();
        assert_eq!(n, 0, "{table}");
    }
    let (orders_left,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE id = $1").bind(summary.order_id).fetch_one(&state.db).await.unwrap();
    assert_eq!(orders_left, 0);
    let (logged,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activities WHERE user_id = $1 AND subject = 'Cancel Order'")
        .bind(f.user_id).fetch_one(&state.db).await.unwrap();
    assert_eq!(logged, 1);
}

#[tokio::test]
#[cfg_attr(not(feature = "db-tests"), ignore)]
async fn test_cancel_is_scoped_to_the_owner() {
    let (state, f) = setup(dec!(30), 10).await;
    let other = fixture(&state.db, dec!(30), 10).await;
    let summary = add_to_cart(&state, f.user_id, f.product_id, &add(&f, 1)).await.unwrap();

    let err = orders::cancel(&state, other.user_id, summary.order_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(open_orders(&state.db, f.user_id).await, 1);
}

#[tokio::test]
#[cfg_attr(not(feature = "db-tests"), ignore)]
async fn test_missing_variant_moves_header_only() {
    let (state, f) = setup(dec!(12), 10).await;
    let req = AddToCartRequest { size_id: f.size_id, colour_id: -1, qty: 2 };
    let summary = add_to_cart(&state, f.user_id, f.product_id, &req).await.unwrap();

    assert!(!summary.line_recorded);
    assert_eq!(summary.subtotal, dec!(24));
    let (lines,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders_details WHERE order_id = $1").bind(summary.order_id).fetch_one(&state.db).await.unwrap();
    assert_eq!(lines, 0);
}

#[tokio::test]
#[cfg_attr(not(feature = "db-tests"), ignore)]
async fn test_concurrent_first_adds_get_distinct_invoices() {
    let db = common::database().await;
    let mut fixtures = Vec::new();
    for _ in 0..8 {
        fixtures.push(fixture(&db, dec!(10), 50).await);
    }
    let state = common::state(db);

    let mut handles = Vec::new();
    for f in &fixtures {
        let state = state.clone();
        let req = add(f, 1);
        let (user_id, product_id) = (f.user_id, f.product_id);
        handles.push(tokio::spawn(async move { add_to_cart(&state, user_id, product_id, &req).await }));
    }
    let mut invoices = Vec::new();
    for handle in handles {
        invoices.push(handle.await.unwrap().unwrap().invoice_number);
    }
    invoices.sort();
    invoices.dedup();
    assert_eq!(invoices.len(), 8);
}

#[tokio::test]
#[cfg_attr(not(feature = "db-tests"), ignore)]
async fn test_order_list_reports_all_and_filtered_totals() {
    let (state, f) = setup(dec!(20), 10).await;
    let first = add_to_cart(&state, f.user_id, f.product_id, &add(&f, 1)).await.unwrap();
    checkout(&state, f.user_id, &billing(&f)).await.unwrap();
    add_to_cart(&state, f.user_id, f.product_id, &add(&f, 1)).await.unwrap();

    let all = orders::list(&state, f.user_id, &OrderListQuery::default()).await.unwrap();
    assert_eq!(all.total_all, 2);
    assert_eq!(all.total_filtered, 2);

    let query = OrderListQuery { search: Some(first.invoice_number.clone()), ..Default::default() };
    let found = orders::list(&state, f.user_id, &query).await.unwrap();
    assert_eq!(found.total_all, 2);
    assert_eq!(found.total_filtered, 1);
    assert_eq!(found.list[0].id, first.order_id);

    let beyond = OrderListQuery { page: Some(i64::MAX), ..Default::default() };
    assert!(orders::list(&state, f.user_id, &beyond).await.unwrap().list.is_empty());
}

#[tokio::test]
#[cfg_attr(not(feature = "db-tests"), ignore)]
async fn test_login_checks_password_before_account_status() {
    let db = common::database().await;
    let email = format!("{}@example.com", Uuid::new_v4().simple());
    let hash = online_store::auth::password::hash_password("s3cret-pass").unwrap();
    sqlx::query("INSERT INTO users (email, password, first_name, status) VALUES ($1, $2, 'Pending', 0)")
        .bind(&email).bind(&hash).execute(&db).await.unwrap();
    let state = common::state(db);

    let wrong = LoginRequest { email: email.clone(), password: "guessing".into() };
    let err = login(&state, &wrong).await.unwrap_err();
    assert!(matches!(&err, AppError::Unauthorized(msg) if msg == "Email or password is incorrect"));

    let right = LoginRequest { email, password: "s3cret-pass".into() };
    let err = login(&state, &right).await.unwrap_err();
    assert!(matches!(&err, AppError::Unauthorized(msg) if msg == "Account has not been confirmed"));
}
