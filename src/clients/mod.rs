//! Typed handles over the actors. Every client is a cheap `Clone`.

mod macros;
mod delivery_client;
mod directory_client;
mod inventory_client;
mod order_client;
mod payout_client;

pub use delivery_client::*;
pub use directory_client::*;
pub use inventory_client::*;
pub use order_client::*;
pub use payout_client::*;
