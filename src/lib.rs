//! Online store backend
//!
//! REST service for a small storefront.
//!
//! ## Features
//! - Catalog browsing with filters, ratings and display badges
//! - Cart aggregation on a single open order per user
//! - Transactional checkout with stock withdrawal and pricing settings
//! - Order history, detail and cancellation
//! - Accounts with e-mail confirmation, password reset and JWT sessions

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod http;
pub mod services;
pub mod store;

use axum::routing::get;
use axum::{Json, Router};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::JwtKeys;
use crate::domain::pricing::SettingsProvider;
use crate::events::EventPublisher;

pub use crate::config::Config;
pub use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub settings: Arc<dyn SettingsProvider>,
    pub jwt: JwtKeys,
    pub events: EventPublisher,
}

impl AppState {
    /// State backed by the database for settings, as the server runs it.
    pub fn new(db: PgPool, jwt: JwtKeys, events: EventPublisher) -> Self {
        let settings = Arc::new(store::PgSettings::new(db.clone()));
        Self { db, settings, jwt, events }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "online-store"})) }))
        .nest("/api", http::routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}
