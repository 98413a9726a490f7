//! Order persistence and the status state machine.

mod actions;
pub mod entity;
pub mod error;
pub mod requests;

pub use actions::*;
pub use error::*;
pub use requests::{CancelOrderRequest, CreateOrderRequest, LineItemRequest, SetStatusRequest};
