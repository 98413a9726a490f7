//! Reference data consumed by checkout: buyers, stores, payment methods,
//! categories, products and coupons. Plain CRUD, no actions.

pub mod entity;
pub mod error;

pub use error::*;
