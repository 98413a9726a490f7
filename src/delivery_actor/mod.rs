//! In-process delivery collaborator. Shipments are keyed by their order id.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
