//! Application services. Each operation owns its connection or transaction and emits its events after commit.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod profile;
