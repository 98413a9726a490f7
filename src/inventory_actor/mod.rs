//! Inventory ledger: per-product reserve, release, commit-sold and restock.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
