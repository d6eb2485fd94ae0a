//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{Badge, DisplayFields};
pub use order::{BillingDetails, CompletedOrder, OrderStatus, OrderTotals, StockMove};
pub use cart::{Cart, CartAddition, CartError, CartLine, LineChange};
