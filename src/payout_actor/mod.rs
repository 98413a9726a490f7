//! Payout records. Written once by the batch processor, never modified.

pub mod entity;
pub mod error;

pub use error::*;
