//! Domain events
//!
//! Every event is written to the user's activity log and, when a broker is configured, published.

use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    Account(AccountEvent),
    Order(OrderEvent),
    Catalog(CatalogEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AccountEvent {
    Registered { user_id: i64 },
    Confirmed { user_id: i64 },
    SignedIn { user_id: i64 },
    PasswordResetRequested { user_id: i64 },
    PasswordReset { user_id: i64 },
    ProfileUpdated { user_id: i64 },
    PasswordChanged { user_id: i64 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    CartUpdated { user_id: i64, order_id: i64, product_id: i64, product_name: String, qty: u32 },
    CheckedOut { user_id: i64, order_id: i64, invoice_number: String, total_paid: Decimal },
    Cancelled { user_id: i64, order_id: i64 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CatalogEvent {
    WishlistAdded { user_id: i64, product_id: i64 },
    ReviewCreated { user_id: i64, product_id: i64, product_name: String },
}

/// Human readable activity log entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityEntry { pub subject: String, pub event: String, pub description: String }

impl ActivityEntry {
    fn new(subject: &str, event: impl Into<String>, description: impl Into<String>) -> Self {
        Self { subject: subject.to_string(), event: event.into(), description: description.into() }
    }
}

impl DomainEvent {
    pub fn user_id(&self) -> i64 {
        match self {
            Self::Account(e) => match e {
                AccountEvent::Registered { user_id } | AccountEvent::Confirmed { user_id }
                | AccountEvent::SignedIn { user_id } | AccountEvent::PasswordResetRequested { user_id }
                | AccountEvent::PasswordReset { user_id } | AccountEvent::ProfileUpdated { user_id }
                | AccountEvent::PasswordChanged { user_id } => *user_id,
            },
            Self::Order(e) => match e {
                OrderEvent::CartUpdated { user_id, .. } | OrderEvent::CheckedOut { user_id, .. }
                | OrderEvent::Cancelled { user_id, .. } => *user_id,
            },
            Self::Catalog(e) => match e {
                CatalogEvent::WishlistAdded { user_id, .. } | CatalogEvent::ReviewCreated { user_id, .. } => *user_id,
            },
        }
    }

    /// Broker subject, e.g. `store.order.checked_out`.
    pub fn subject(&self) -> String {
        let (area, name) = match self {
            Self::Account(e) => ("account", match e {
                AccountEvent::Registered { .. } => "registered",
                AccountEvent::Confirmed { .. } => "confirmed",
                AccountEvent::SignedIn { .. } => "signed_in",
                AccountEvent::PasswordResetRequested { .. } => "password_reset_requested",
                AccountEvent::PasswordReset { .. } => "password_reset",
                AccountEvent::ProfileUpdated { .. } => "profile_updated",
                AccountEvent::PasswordChanged { .. } => "password_changed",
            }),
            Self::Order(e) => ("order", match e {
                OrderEvent::CartUpdated { .. } => "cart_updated",
                OrderEvent::CheckedOut { .. } => "checked_out",
                OrderEvent::Cancelled { .. } => "cancelled",
            }),
            Self::Catalog(e) => ("catalog", match e {
                CatalogEvent::WishlistAdded { .. } => "wishlist_added",
                CatalogEvent::ReviewCreated { .. } => "review_created",
            }),
        };
        format!("store.{area}.{name}")
    }

    pub fn activity(&self) -> ActivityEntry {
        match self {
            Self::Account(e) => match e {
                AccountEvent::Registered { .. } => ActivityEntry::new("User Register", "Sign Up", "Register new user account"),
                AccountEvent::Confirmed { .. } => ActivityEntry::new("User Verification", "Email Confirmation", "Confirm new member registration account"),
                AccountEvent::SignedIn { .. } => ActivityEntry::new("User Login", "Sign In", "Sign in to application"),
                AccountEvent::PasswordResetRequested { .. } => ActivityEntry::new("Request Forgot Password", "Forgot Password", "Request reset password link"),
                AccountEvent::PasswordReset { .. } => ActivityEntry::new("User Recovery", "Reset Password", "Reset account password"),
                AccountEvent::ProfileUpdated { .. } => ActivityEntry::new("Update Profile", "Edit Profile", "Update user profile"),
                AccountEvent::PasswordChanged { .. } => ActivityEntry::new("Change Password", "Edit Password", "Change account password"),
            },
            Self::Order(e) => match e {
                OrderEvent::CartUpdated { product_name, .. } => ActivityEntry::new(
                    "Add Cart",
                    format!("Add product to cart with name {product_name}"),
                    format!("Product {product_name} has been added to your cart."),
                ),
                OrderEvent::CheckedOut { invoice_number, .. } => ActivityEntry::new(
                    "Checkout Order",
                    "Completed Checkout Current Order",
                    format!("Your order {invoice_number} has been finished."),
                ),
                OrderEvent::Cancelled { .. } => ActivityEntry::new("Cancel Order", "Canceling Current Order", "Your order has been cancelled."),
            },
            Self::Catalog(e) => match e {
                CatalogEvent::WishlistAdded { .. } => ActivityEntry::new("Add Wishlist", "Add Product To Wishlist", "Product has been added to your wishlist."),
                CatalogEvent::ReviewCreated { product_name, .. } => ActivityEntry::new(
                    "Create new review",
                    format!("Add review to {product_name}"),
                    format!("A new review has been added to {product_name}"),
                ),
            },
        }
    }
}
