//! HTTP surface: the `/api` router and its handlers.

pub mod auth;
pub mod extract;
pub mod home;
pub mod order;
pub mod profile;
pub mod shop;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub(crate) fn message(text: &str) -> Json<Value> {
    Json(json!({"status": true, "message": text}))
}

/// Routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/home/ping", get(home::ping))
        .route("/home/component", get(home::component))
        .route("/home/page", get(home::page))
        .route("/home/newsletter", post(home::newsletter))
        .route("/auth/register", post(auth::register))
        .route("/auth/confirm/:token", get(auth::confirm))
        .route("/auth/login", post(auth::login))
        .route("/auth/email/forgot", post(auth::forgot))
        .route("/auth/email/reset/:token", post(auth::reset))
        .route("/profile/detail", get(profile::detail))
        .route("/profile/activity", get(profile::activity))
        .route("/profile/refresh", get(profile::refresh))
        .route("/profile/update", post(profile::update))
        .route("/profile/password", post(profile::password))
        .route("/shop/filter", get(shop::filter))
        .route("/shop/list", get(shop::list))
        .route("/order/session", get(order::session))
        .route("/order/cart/:id", get(order::product))
        .route("/order/create/cart/:id", post(order::add_to_cart))
        .route("/order/wishlist/:id", get(order::wishlist))
        .route("/order/review/:id", get(order::reviews).post(order::create_review))
        .route("/order/checkout/initial", get(order::checkout_initial))
        .route("/order/checkout/submit", post(order::checkout_submit))
        .route("/order/list", get(order::list))
        .route("/order/detail/:id", get(order::detail))
        .route("/order/cancel/:id", get(order::cancel))
}
