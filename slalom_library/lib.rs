//! # slalom library
//!
//! Obstacle-course navigation for a ground vehicle with a single ranging sensor on
//! a steerable mast.
//!
//! ## Structure
//!
//! ```text
//! slalom_library/
//! ── algorithms/     # Pure computation: range filter, clearance, turn decision
//! ── nodes/          # Control loop stages that drive a Vehicle
//! ── drivers/        # Vehicle implementations (PiCar-4WD, simulation, scripted)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use slalom_library::prelude::*;
//!
//! let config = ControlConfig::default();
//! let mut vehicle = SimulatedVehicle::new(SimulationConfig::default())?;
//!
//! let navigator = ObstacleNavigator::new(&config)?;
//! let report = navigator.navigate(&mut vehicle)?;
//! println!("turned {}", report.survey.decision);
//! ```

pub mod algorithms;
pub mod drivers;
pub mod nodes;

pub use algorithms::clearance::{ClearanceEstimate, ClearanceEstimator};
pub use algorithms::range_filter::RangeFilter;
pub use algorithms::turn_decision::{decide, TurnDecision};

pub use nodes::approach::ApproachController;
pub use nodes::arc_scanner::{ArcScan, ArcScanner, ScanSample};
pub use nodes::course::{CourseReport, CourseRunner};
pub use nodes::finale::{Finale, FinaleStep};
pub use nodes::navigator::{NavigationReport, ObstacleNavigator, Survey};

pub use drivers::scripted::{ScriptedCommand, ScriptedVehicle};
pub use drivers::sim::{NoiseModel, ObstacleScene, SceneOutcome, SimulatedVehicle, SimulationConfig};

#[cfg(feature = "raspberry-pi")]
pub use drivers::picar::PicarVehicle;
pub use drivers::picar::{MotorConfig, PicarConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use slalom_core::{
        ArcConfig, ControlConfig, MastAngle, MotionCommand, RangeReading, Side, SlalomError,
        SlalomResult, Vehicle,
    };

    pub use crate::algorithms::{
        clearance::{ClearanceEstimate, ClearanceEstimator},
        range_filter::RangeFilter,
        turn_decision::{decide, TurnDecision},
    };

    pub use crate::nodes::{
        approach::ApproachController,
        arc_scanner::{ArcScan, ArcScanner},
        course::{CourseReport, CourseRunner},
        finale::Finale,
        navigator::{NavigationReport, ObstacleNavigator, Survey},
    };

    pub use crate::drivers::{
        scripted::ScriptedVehicle,
        sim::{SimulatedVehicle, SimulationConfig},
    };
}
