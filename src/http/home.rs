use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::Result;
use crate::http::extract::{ClientIp, JsonBody};
use crate::http::message;
use crate::services::catalog::{self, HomeComponent, HomePage, NewsletterRequest};
use crate::AppState;

pub async fn ping() -> Json<Value> {
    Json(json!({"status": true, "message": "online-store is up"}))
}

pub async fn component(State(s): State<AppState>) -> Result<Json<HomeComponent>> {
    Ok(Json(catalog::home_component(&s).await?))
}

pub async fn page(State(s): State<AppState>) -> Result<Json<HomePage>> {
    Ok(Json(catalog::home_page(&s).await?))
}

pub async fn newsletter(State(s): State<AppState>, ClientIp(ip): ClientIp, JsonBody(r): JsonBody<NewsletterRequest>) -> Result<Json<Value>> {
    catalog::subscribe_newsletter(&s, &r, &ip).await?;
    Ok(message("Subscribed to the newsletter"))
}
