use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error::Result;
use crate::http::extract::{AuthUser, JsonBody};
use crate::http::message;
use crate::services::auth::TokenIssued;
use crate::services::profile::{self, PasswordChange, ProfileUpdate};
use crate::store::models::{Activity, User};
use crate::AppState;

pub async fn detail(State(s): State<AppState>, user: AuthUser) -> Result<Json<User>> {
    Ok(Json(profile::detail(&s, user.id).await?))
}

pub async fn activity(State(s): State<AppState>, user: AuthUser) -> Result<Json<Vec<Activity>>> {
    Ok(Json(profile::activities(&s, user.id).await?))
}

pub async fn refresh(State(s): State<AppState>, user: AuthUser) -> Result<Json<TokenIssued>> {
    Ok(Json(profile::refresh(&s, user.id).await?))
}

pub async fn update(State(s): State<AppState>, user: AuthUser, JsonBody(r): JsonBody<ProfileUpdate>) -> Result<Json<User>> {
    Ok(Json(profile::update(&s, user.id, &r).await?))
}

pub async fn password(State(s): State<AppState>, user: AuthUser, JsonBody(r): JsonBody<PasswordChange>) -> Result<Json<Value>> {
    profile::change_password(&s, user.id, &r).await?;
    Ok(message("Password has been changed"))
}
