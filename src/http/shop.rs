use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use crate::error::{AppError, Result};
use crate::services::catalog::{self, ShopFilter, ShopList, ShopQuery};
use crate::AppState;

pub async fn filter(State(s): State<AppState>) -> Result<Json<ShopFilter>> {
    Ok(Json(catalog::shop_filter(&s).await?))
}

pub async fn list(State(s): State<AppState>, query: std::result::Result<Query<ShopQuery>, QueryRejection>) -> Result<Json<ShopList>> {
    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    Ok(Json(catalog::shop_list(&s, &query).await?))
}
