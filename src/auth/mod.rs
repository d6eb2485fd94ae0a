//! Credentials: one-way password hashing and bearer tokens.
pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtKeys};
