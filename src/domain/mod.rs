//! Store domain: cart aggregation, checkout, pricing and display rules, free of persistence.
pub mod aggregates;
pub mod events;
pub mod pricing;
pub mod value_objects;
