//! System configuration, startup and shutdown.

pub mod config;
pub mod marketplace_system;
pub mod logging;

pub use config::*;
pub use marketplace_system::*;
pub use logging::*;
