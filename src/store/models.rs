//! Row types returned by the store queries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64, pub email: String, pub phone: Option<String>,
    #[serde(skip)] pub password: String,
    pub image: Option<String>, pub first_name: Option<String>, pub last_name: Option<String>,
    pub gender: Option<String>, pub country: Option<String>, pub city: Option<String>,
    pub zip_code: Option<String>, pub address: Option<String>, pub status: i16,
    pub created_at: DateTime<Utc>, pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool { self.status == 1 }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Authentication { pub id: i64, pub user_id: i64, pub auth_type: String, pub credential: String, pub token: Uuid, pub status: i16, pub expired_at: DateTime<Utc> }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Activity { pub id: i64, pub user_id: i64, pub subject: String, pub event: String, pub description: String, pub created_at: DateTime<Utc> }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category { pub id: i64, pub image: Option<String>, pub name: String, pub description: Option<String>, pub displayed: i16 }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NamedCount { pub id: i64, pub name: String, pub total: i64 }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Size { pub id: i64, pub name: String, pub description: Option<String> }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Colour { pub id: i64, pub code: String, pub name: String, pub description: Option<String> }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Payment { pub id: i64, pub name: String, pub description: Option<String> }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64, pub brand_id: i64, pub image: Option<String>, pub sku: String, pub name: String,
    pub price: Decimal, pub total_order: i32, pub total_rating: i32,
    pub description: Option<String>, pub details: Option<String>, pub status: i16,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductImage { pub id: i64, pub product_id: i64, pub path: String, pub sort: i32 }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Inventory { pub id: i64, pub product_id: i64, pub size_id: i64, pub colour_id: i64, pub stock: i32 }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review { pub id: i64, pub product_id: i64, pub user_id: i64, pub first_name: Option<String>, pub last_name: Option<String>, pub rating: i32, pub review: Option<String>, pub created_at: DateTime<Utc> }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64, pub user_id: i64, pub payment_id: Option<i64>, pub invoice_number: String,
    pub total_item: i32, pub subtotal: Decimal, pub total_discount: Decimal, pub total_taxes: Decimal,
    pub total_shipment: Decimal, pub total_paid: Decimal, pub status: i16,
    pub created_at: DateTime<Utc>, pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderDetail { pub id: i64, pub order_id: i64, pub inventory_id: i64, pub product_id: i64, pub price: Decimal, pub qty: i32, pub total: Decimal }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderBilling { pub id: i64, pub order_id: i64, pub name: String, pub description: Option<String> }

/// A cart line joined with its product, as shown to the customer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartProduct { pub id: i64, pub image: Option<String>, pub name: String, pub price: Decimal, pub qty: i32, pub total: Decimal }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WishlistProduct { pub id: i64, pub image: Option<String>, pub name: String, pub price: Decimal }
