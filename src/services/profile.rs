//! The signed-in user's own account.

use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::domain::events::{AccountEvent, DomainEvent};
use crate::error::{AppError, Result};
use crate::services::auth::{check_new_password, TokenIssued};
use crate::store::models::{Activity, User};
use crate::store::users::{self, ProfileChanges};
use crate::store::activity;
use crate::AppState;

pub const ACTIVITY_LIMIT: i64 = 50;

pub async fn detail(state: &AppState, user_id: i64) -> Result<User> {
    let mut conn = state.db.acquire().await?;
    users::find(&mut conn, user_id).await?.ok_or_else(|| AppError::not_found("User"))
}

pub async fn activities(state: &AppState, user_id: i64) -> Result<Vec<Activity>> {
    let mut conn = state.db.acquire().await?;
    Ok(activity::recent(&mut conn, user_id, ACTIVITY_LIMIT).await?)
}

/// Issues a fresh token for a user that still exists and is active.
pub async fn refresh(state: &AppState, user_id: i64) -> Result<TokenIssued> {
    let user = detail(state, user_id).await?;
    if !user.is_active() {
        return Err(AppError::Unauthorized("Account has not been confirmed".into()));
    }
    Ok(TokenIssued { token: state.jwt.issue(user.id, &user.email)? })
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ProfileUpdate {
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub address: Option<String>,
}

impl From<&ProfileUpdate> for ProfileChanges {
    fn from(p: &ProfileUpdate) -> Self {
        Self {
            email: p.email.clone(),
            phone: p.phone.clone(),
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            gender: p.gender.clone(),
            country: p.country.clone(),
            city: p.city.clone(),
            zip_code: p.zip_code.clone(),
            address: p.address.clone(),
        }
    }
}

#[instrument(skip(state, req))]
pub async fn update(state: &AppState, user_id: i64, req: &ProfileUpdate) -> Result<User> {
    req.validate()?;
    let mut tx = state.db.begin().await?;
    users::lock(&mut tx, user_id).await?.ok_or_else(|| AppError::not_found("User"))?;
    if users::email_taken(&mut tx, &req.email, Some(user_id)).await? {
        return Err(AppError::Validation("Email is already registered".into()));
    }
    let user = users::update_profile(&mut tx, user_id, &ProfileChanges::from(req)).await?;

    let event = DomainEvent::Account(AccountEvent::ProfileUpdated { user_id });
    activity::record(&mut tx, &event).await?;
    tx.commit().await?;
    state.events.publish(&event).await;
    Ok(user)
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub password: String,
    pub password_confirm: String,
}

#[instrument(skip(state, req))]
pub async fn change_password(state: &AppState, user_id: i64, req: &PasswordChange) -> Result<()> {
    check_new_password(&req.password, &req.password_confirm)?;
    let mut tx = state.db.begin().await?;
    let user = users::lock(&mut tx, user_id).await?.ok_or_else(|| AppError::not_found("User"))?;
    if !verify_password(&req.old_password, &user.password)? {
        return Err(AppError::Validation("Old password is incorrect".into()));
    }
    users::set_password(&mut tx, user_id, &hash_password(&req.password)?).await?;

    let event = DomainEvent::Account(AccountEvent::PasswordChanged { user_id });
    activity::record(&mut tx, &event).await?;
    tx.commit().await?;
    state.events.publish(&event).await;
    Ok(())
}
