//! Lattice Cart
//!
//! The storefront cart ledger: line items keyed by product, size and color,
//! with totals that always match the lines, plus persistence and checkout
//! handoff around it.

pub mod cart;
pub mod checkout;
pub mod fixtures;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod storage;
pub mod summary;
pub mod utils;
