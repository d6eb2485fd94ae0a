//! Error type shared by the store, services and HTTP handlers.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;

use crate::domain::aggregates::CartError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Insufficient stock for inventory {0}")]
    InsufficientStock(i64),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hash error: {0}")]
    Hash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn not_found(what: &str) -> Self { Self::NotFound(format!("{what} not found")) }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::NotFound(_) | Self::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::Config(_) | Self::Database(_) | Self::Hash(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message rendered to the client. Server-side failures are not described.
    pub fn response_message(&self) -> String {
        match self {
            Self::Token(_) => "Invalid or expired token".to_string(),
            Self::Config(_) | Self::Database(_) | Self::Hash(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self { Self::Validation(err.to_string()) }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(err: argon2::password_hash::Error) -> Self { Self::Hash(err.to_string()) }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self { Self::Internal(err.to_string()) }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.response_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::not_found("Order").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized("nope".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Config("bad".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Database(sqlx::Error::RowNotFound).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        assert_eq!(AppError::Config("setting taxes_value is not a number".into()).response_message(), "Internal server error");
        assert_eq!(AppError::not_found("Order").response_message(), "Order not found");
    }
}
