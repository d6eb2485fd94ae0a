//! Registration, e-mail confirmation, login and password reset.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::domain::events::{AccountEvent, DomainEvent};
use crate::error::{AppError, Result};
use crate::store::models::Authentication;
use crate::store::{activity, users};
use crate::AppState;

/// Lifetime of confirmation and reset tokens.
pub const TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct TokenIssued {
    pub token: String,
}

/// Rules for a new password: minimum length and a matching confirmation.
pub(crate) fn check_new_password(password: &str, confirm: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!("password must be at least {MIN_PASSWORD_LEN} characters")));
    }
    if password != confirm {
        return Err(AppError::Validation("password_confirm does not match password".into()));
    }
    Ok(())
}

/// Splits a display name on its first space.
pub fn split_name(name: &str) -> (String, String) {
    match name.trim().split_once(' ') {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (name.trim().to_string(), String::new()),
    }
}

fn parse_token(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::Validation("Token is invalid or expired".into()))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[instrument(skip_all, fields(email = %req.email))]
pub async fn register(state: &AppState, req: &RegisterRequest) -> Result<TokenIssued> {
    req.validate()?;
    check_new_password(&req.password, &req.password_confirm)?;
    let hash = hash_password(&req.password)?;
    let (first_name, last_name) = split_name(&req.name);

    let mut tx = state.db.begin().await?;
    if users::email_taken(&mut tx, &req.email, None).await? {
        return Err(AppError::Validation("Email is already registered".into()));
    }
    let user = users::create(&mut tx, &req.email, &hash, &first_name, &last_name).await?;
    let expires_at = Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES);
    let token = users::create_token(&mut tx, user.id, users::EMAIL_CONFIRM, &user.email, expires_at).await?;

    let event = DomainEvent::Account(AccountEvent::Registered { user_id: user.id });
    activity::record(&mut tx, &event).await?;
    tx.commit().await?;
    state.events.publish(&event).await;

    info!(user_id = user.id, "user registered");
    Ok(TokenIssued { token: token.to_string() })
}

#[instrument(skip_all)]
pub async fn confirm(state: &AppState, raw_token: &str) -> Result<()> {
    let token = parse_token(raw_token)?;
    let mut tx = state.db.begin().await?;
    let auth: Authentication = users::pending_token(&mut tx, users::EMAIL_CONFIRM, token).await?
        .ok_or_else(|| AppError::Validation("Token is invalid or expired".into()))?;
    users::activate(&mut tx, auth.user_id).await?;
    users::consume_token(&mut tx, auth.id).await?;

    let event = DomainEvent::Account(AccountEvent::Confirmed { user_id: auth.user_id });
    activity::record(&mut tx, &event).await?;
    tx.commit().await?;
    state.events.publish(&event).await;
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[instrument(skip_all, fields(email = %req.email))]
pub async fn login(state: &AppState, req: &LoginRequest) -> Result<TokenIssued> {
    req.validate()?;
    let mut conn = state.db.acquire().await?;
    let rejected = || AppError::Unauthorized("Email or password is incorrect".into());

    let user = users::find_by_email(&mut conn, &req.email).await?.ok_or_else(rejected)?;
    if !verify_password(&req.password, &user.password)? {
        return Err(rejected());
    }
    if !user.is_active() {
        warn!(user_id = user.id, "login attempt on unconfirmed account");
        return Err(AppError::Unauthorized("Account has not been confirmed".into()));
    }

    let token = state.jwt.issue(user.id, &user.email)?;
    let event = DomainEvent::Account(AccountEvent::SignedIn { user_id: user.id });
    activity::record(&mut conn, &event).await?;
    state.events.publish(&event).await;
    Ok(TokenIssued { token })
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotRequest {
    #[validate(email(message = "email is not valid"))]
    pub email: String,
}

#[instrument(skip_all, fields(email = %req.email))]
pub async fn forgot(state: &AppState, req: &ForgotRequest) -> Result<TokenIssued> {
    req.validate()?;
    let mut tx = state.db.begin().await?;
    let user = users::find_by_email(&mut tx, &req.email).await?.ok_or_else(|| AppError::not_found("User"))?;
    let expires_at = Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES);
    let token = users::create_token(&mut tx, user.id, users::RESET_PASSWORD, &user.email, expires_at).await?;

    let event = DomainEvent::Account(AccountEvent::PasswordResetRequested { user_id: user.id });
    activity::record(&mut tx, &event).await?;
    tx.commit().await?;
    state.events.publish(&event).await;
    Ok(TokenIssued { token: token.to_string() })
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetRequest {
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[instrument(skip_all)]
pub async fn reset(state: &AppState, raw_token: &str, req: &ResetRequest) -> Result<()> {
    req.validate()?;
    check_new_password(&req.password, &req.password_confirm)?;
    let token = parse_token(raw_token)?;
    let hash = hash_password(&req.password)?;

    let mut tx = state.db.begin().await?;
    let auth = users::pending_token(&mut tx, users::RESET_PASSWORD, token).await?
        .ok_or_else(|| AppError::Validation("Token is invalid or expired".into()))?;
    let user = users::find(&mut tx, auth.user_id).await?.ok_or_else(|| AppError::not_found("User"))?;
    if !user.email.eq_ignore_ascii_case(req.email.trim()) {
        return Err(AppError::Validation("Token is invalid or expired".into()));
    }
    users::set_password(&mut tx, user.id, &hash).await?;
    users::consume_token(&mut tx, auth.id).await?;

    let event = DomainEvent::Account(AccountEvent::PasswordReset { user_id: user.id });
    activity::record(&mut tx, &event).await?;
    tx.commit().await?;
    state.events.publish(&event).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("Jane Mary Doe"), ("Jane".to_string(), "Mary Doe".to_string()));
        assert_eq!(split_name("  Cher "), ("Cher".to_string(), String::new()));
    }

    #[test]
    fn test_register_validation() {
        let req = RegisterRequest {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            password: "s3cret-pass".into(),
            password_confirm: "s3cret-pass".into(),
        };
        assert!(req.validate().is_ok());
        assert!(RegisterRequest { name: String::new(), ..req.clone() }.validate().is_err());
        assert!(RegisterRequest { email: "jane".into(), ..req }.validate().is_err());
    }

    #[test]
    fn test_password_confirmation() {
        assert!(check_new_password("abcdefgh", "abcdefgh").is_ok());
        assert!(matches!(check_new_password("short", "short"), Err(AppError::Validation(_))));
        assert!(matches!(check_new_password("abcdefgh", "abcdefgx"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_token_rejects_garbage() {
        assert!(parse_token("not-a-uuid").is_err());
        assert!(parse_token(&Uuid::new_v4().to_string()).is_ok());
    }
}
