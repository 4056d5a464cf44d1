//! # slalom manager
//!
//! Command implementations behind the `slalom` binary. Kept in a library so
//! they can be driven from tests against the simulator.

pub mod backend;
pub mod commands;
pub mod config;

pub use backend::{open_vehicle, Backend, StopOnDrop};
pub use config::SlalomConfig;
