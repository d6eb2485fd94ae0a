use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::http::extract::{AuthUser, JsonBody, PathParam};
use crate::http::message;
use crate::services::cart::{self, AddToCartRequest, CartSummary};
use crate::services::catalog::{self, ProductPage, ReviewRequest, ReviewView};
use crate::services::checkout::{self, CheckoutPreview, CheckoutReceipt, CheckoutRequest};
use crate::services::orders::{self, OrderDetailView, OrderList, OrderListQuery, SessionView};
use crate::AppState;

pub async fn session(State(s): State<AppState>, user: AuthUser) -> Result<Json<SessionView>> {
    Ok(Json(orders::session(&s, user.id).await?))
}

pub async fn product(State(s): State<AppState>, _user: AuthUser, PathParam(id): PathParam<i64>) -> Result<Json<ProductPage>> {
    Ok(Json(catalog::product_page(&s, id).await?))
}

pub async fn add_to_cart(State(s): State<AppState>, user: AuthUser, PathParam(id): PathParam<i64>, JsonBody(r): JsonBody<AddToCartRequest>) -> Result<Json<CartSummary>> {
    Ok(Json(cart::add_to_cart(&s, user.id, id, &r).await?))
}

pub async fn wishlist(State(s): State<AppState>, user: AuthUser, PathParam(id): PathParam<i64>) -> Result<Json<Value>> {
    catalog::add_to_wishlist(&s, user.id, id).await?;
    Ok(message("Added to wishlist"))
}

pub async fn reviews(State(s): State<AppState>, _user: AuthUser, PathParam(id): PathParam<i64>) -> Result<Json<Vec<ReviewView>>> {
    Ok(Json(catalog::reviews(&s, id).await?))
}

pub async fn create_review(State(s): State<AppState>, user: AuthUser, PathParam(id): PathParam<i64>, JsonBody(r): JsonBody<ReviewRequest>) -> Result<Json<Value>> {
    catalog::create_review(&s, user.id, id, &r).await?;
    Ok(message("Review submitted"))
}

pub async fn checkout_initial(State(s): State<AppState>, user: AuthUser) -> Result<Json<CheckoutPreview>> {
    Ok(Json(checkout::preview(&s, user.id).await?))
}

pub async fn checkout_submit(State(s): State<AppState>, user: AuthUser, JsonBody(r): JsonBody<CheckoutRequest>) -> Result<Json<CheckoutReceipt>> {
    Ok(Json(checkout::checkout(&s, user.id, &r).await?))
}

pub async fn list(State(s): State<AppState>, user: AuthUser, query: std::result::Result<Query<OrderListQuery>, QueryRejection>) -> Result<Json<OrderList>> {
    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    Ok(Json(orders::list(&s, user.id, &query).await?))
}

pub async fn detail(State(s): State<AppState>, user: AuthUser, PathParam(id): PathParam<i64>) -> Result<Json<OrderDetailView>> {
    Ok(Json(orders::detail(&s, user.id, id).await?))
}

pub async fn cancel(State(s): State<AppState>, user: AuthUser, PathParam(id): PathParam<i64>) -> Result<Json<Value>> {
    orders::cancel(&s, user.id, id).await?;
    Ok(message("Order has been cancelled"))
}
