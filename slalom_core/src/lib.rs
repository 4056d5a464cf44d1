//! # slalom core
//!
//! Shared building blocks for the slalom obstacle-course controller:
//!
//! - [`hal`] - the [`Vehicle`](hal::Vehicle) capability trait every driver implements,
//!   plus the range/command data types that cross it
//! - [`config`] - tunable control parameters (speeds, thresholds, scan arcs, timings)
//! - [`error`] - the crate-wide error type
//!
//! Nothing in here talks to hardware. Drivers and the control loop live in
//! `slalom_library`.

pub mod config;
pub mod error;
pub mod hal;

pub use config::{
    ApproachConfig, ArcConfig, ControlConfig, CourseConfig, DriveConfig, ScanConfig, TurnConfig,
};
pub use error::{SlalomError, SlalomResult};
pub use hal::{MastAngle, MotionCommand, RangeReading, Side, Vehicle};
