use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::store::models::{Authentication, User};

const USER_COLUMNS: &str = "id, email, phone, password, image, first_name, last_name, gender, country, city, zip_code, address, status, created_at, updated_at";

pub const EMAIL_CONFIRM: &str = "email-confirm";
pub const RESET_PASSWORD: &str = "reset-password";

pub async fn find(conn: &mut PgConnection, id: i64) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id).fetch_optional(conn).await
}

/// Locks the user row for the rest of the transaction; cart mutations of one user serialize on it.
pub async fn lock(conn: &mut PgConnection, id: i64) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"))
        .bind(id).fetch_optional(conn).await
}

pub async fn find_by_email(conn: &mut PgConnection, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"))
        .bind(email.trim()).fetch_optional(conn).await
}

pub async fn email_taken(conn: &mut PgConnection, email: &str, except_id: Option<i64>) -> sqlx::Result<bool> {
    let (taken,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1) AND id <> COALESCE($2::BIGINT, 0))")
        .bind(email.trim()).bind(except_id).fetch_one(conn).await?;
    Ok(taken)
}

pub async fn create(conn: &mut PgConnection, email: &str, password_hash: &str, first_name: &str, last_name: &str) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, password, first_name, last_name, status) VALUES ($1, $2, $3, $4, 0) RETURNING {USER_COLUMNS}"
    ))
    .bind(email.trim()).bind(password_hash).bind(first_name).bind(last_name)
    .fetch_one(conn).await
}

pub async fn activate(conn: &mut PgConnection, id: i64) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET status = 1, updated_at = NOW() WHERE id = $1").bind(id).execute(conn).await?;
    Ok(())
}

pub async fn set_password(conn: &mut PgConnection, id: i64, password_hash: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET password = $2, status = 1, updated_at = NOW() WHERE id = $1")
        .bind(id).bind(password_hash).execute(conn).await?;
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: String, pub phone: Option<String>, pub first_name: Option<String>, pub last_name: Option<String>,
    pub gender: Option<String>, pub country: Option<String>, pub city: Option<String>,
    pub zip_code: Option<String>, pub address: Option<String>,
}

pub async fn update_profile(conn: &mut PgConnection, id: i64, p: &ProfileChanges) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET email = $2, phone = $3, first_name = $4, last_name = $5, gender = $6, country = $7, city = $8, zip_code = $9, address = $10, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(id).bind(p.email.trim()).bind(&p.phone).bind(&p.first_name).bind(&p.last_name)
    .bind(&p.gender).bind(&p.country).bind(&p.city).bind(&p.zip_code).bind(&p.address)
    .fetch_one(conn).await
}

pub async fn create_token(conn: &mut PgConnection, user_id: i64, auth_type: &str, credential: &str, expires_at: DateTime<Utc>) -> sqlx::Result<Uuid> {
    let token = Uuid::new_v4();
    sqlx::query("INSERT INTO authentications (user_id, auth_type, credential, token, status, expired_at) VALUES ($1, $2, $3, $4, 0, $5)")
        .bind(user_id).bind(auth_type).bind(credential).bind(token).bind(expires_at)
        .execute(conn).await?;
    Ok(token)
}

/// A pending, unexpired token of the given type. Locked until the transaction ends.
pub async fn pending_token(conn: &mut PgConnection, auth_type: &str, token: Uuid) -> sqlx::Result<Option<Authentication>> {
    sqlx::query_as::<_, Authentication>(
        "SELECT id, user_id, auth_type, credential, token, status, expired_at FROM authentications WHERE auth_type = $1 AND token = $2 AND status = 0 AND expired_at > NOW() FOR UPDATE",
    )
    .bind(auth_type).bind(token).fetch_optional(conn).await
}

pub async fn consume_token(conn: &mut PgConnection, id: i64) -> sqlx::Result<()> {
    sqlx::query("UPDATE authentications SET status = 2, expired_at = NOW(), updated_at = NOW() WHERE id = $1")
        .bind(id).execute(conn).await?;
    Ok(())
}
