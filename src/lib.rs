//! Order fulfillment and seller settlement for a multi-store marketplace.
//!
//! Every persisted entity lives in a single-writer [`actor_framework::ResourceActor`];
//! the typed clients in [`clients`] hold the workflows. Checkout reserves
//! stock before an order is written, status changes run inside the order
//! actor, and [`payout_processor::PayoutProcessor`] turns fulfilled orders
//! into payouts on a schedule.

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod clock;
pub mod delivery_actor;
pub mod directory_actor;
pub mod domain;
pub mod error;
pub mod inventory_actor;
pub mod notifications;
pub mod order_actor;
pub mod payout_actor;
pub mod payout_processor;
pub mod pricing;
pub mod scheduler;

#[cfg(test)]
mod mock_framework;
