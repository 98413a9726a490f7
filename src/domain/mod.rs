//! Business entities, free of actor plumbing.

pub mod account;
pub mod catalog;
pub mod ids;
pub mod inventory;
pub mod money;
pub mod order;
pub mod payout;
pub mod shipment;

pub use account::*;
pub use catalog::*;
pub use ids::*;
pub use inventory::*;
pub use money::*;
pub use order::*;
pub use payout::*;
pub use shipment::*;
