//! Vehicle drivers
//!
//! Implementations of [`slalom_core::Vehicle`]:
//!
//! - `PicarVehicle` - SunFounder PiCar-4WD HAT on a Raspberry Pi (feature `raspberry-pi`)
//! - [`SimulatedVehicle`](sim::SimulatedVehicle) - scene-based simulator with sensor noise
//! - [`ScriptedVehicle`](scripted::ScriptedVehicle) - replays canned readings and records commands

pub mod picar;
pub mod scripted;
pub mod sim;
