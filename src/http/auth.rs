use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::error::Result;
use crate::http::extract::{JsonBody, PathParam};
use crate::http::message;
use crate::services::auth::{self, ForgotRequest, LoginRequest, RegisterRequest, ResetRequest, TokenIssued};
use crate::AppState;

pub async fn register(State(s): State<AppState>, JsonBody(r): JsonBody<RegisterRequest>) -> Result<(StatusCode, Json<TokenIssued>)> {
    Ok((StatusCode::CREATED, Json(auth::register(&s, &r).await?)))
}

pub async fn confirm(State(s): State<AppState>, PathParam(token): PathParam<String>) -> Result<Json<Value>> {
    auth::confirm(&s, &token).await?;
    Ok(message("Account confirmed"))
}

pub async fn login(State(s): State<AppState>, JsonBody(r): JsonBody<LoginRequest>) -> Result<Json<TokenIssued>> {
    Ok(Json(auth::login(&s, &r).await?))
}

pub async fn forgot(State(s): State<AppState>, JsonBody(r): JsonBody<ForgotRequest>) -> Result<Json<TokenIssued>> {
    Ok(Json(auth::forgot(&s, &r).await?))
}

pub async fn reset(State(s): State<AppState>, PathParam(token): PathParam<String>, JsonBody(r): JsonBody<ResetRequest>) -> Result<Json<Value>> {
    auth::reset(&s, &token, &r).await?;
    Ok(message("Password has been reset"))
}
