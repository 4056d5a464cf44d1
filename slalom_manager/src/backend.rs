//! Vehicle backends and shutdown handling

use crate::config::SlalomConfig;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use slalom_core::{MastAngle, RangeReading, SlalomResult, Vehicle};
use slalom_library::{PicarConfig, SimulatedVehicle};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Which vehicle to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Scene-based simulator
    Sim,
    /// SunFounder PiCar-4WD (needs the `raspberry-pi` feature)
    Picar,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Sim => write!(f, "sim"),
            Backend::Picar => write!(f, "picar"),
        }
    }
}

/// Open the vehicle for `backend`
///
/// `obstacles` is the number of obstacles the caller is about to navigate; the
/// simulator refuses to run more obstacles than it has scenes.
pub fn open_vehicle(
    backend: Backend,
    config: &SlalomConfig,
    obstacles: u32,
) -> Result<Box<dyn Vehicle>> {
    match backend {
        Backend::Sim => {
            let vehicle = SimulatedVehicle::new(config.simulation.clone())
                .context("Failed to set up simulation")?;
            if obstacles as usize > vehicle.scene_count() {
                bail!(
                    "course has {} obstacles but the simulation only defines {} scenes",
                    obstacles,
                    vehicle.scene_count()
                );
            }
            Ok(Box::new(vehicle))
        }
        Backend::Picar => open_picar(config),
    }
}

#[cfg(feature = "raspberry-pi")]
fn open_picar(config: &SlalomConfig) -> Result<Box<dyn Vehicle>> {
    let vehicle = slalom_library::PicarVehicle::open(&config.picar)
        .context("Failed to open the PiCar-4WD")?;
    Ok(Box::new(vehicle))
}

#[cfg(not(feature = "raspberry-pi"))]
fn open_picar(_config: &SlalomConfig) -> Result<Box<dyn Vehicle>> {
    bail!("slalom was built without the `raspberry-pi` feature; rebuild with --features raspberry-pi")
}

/// Halt the car from the Ctrl+C handler, then exit with status 130
///
/// The control loop keeps its own handle; the handler only reaches the motors
/// through a fresh bus handle.
pub fn install_stop_handler(backend: Backend, config: &SlalomConfig) -> Result<()> {
    let picar = config.picar.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nCtrl+C received, stopping the vehicle");
        if backend == Backend::Picar {
            stop_picar_motors(&picar);
        }
        std::process::exit(130);
    })
    .context("Failed to install Ctrl+C handler")
}

#[cfg(feature = "raspberry-pi")]
fn stop_picar_motors(config: &PicarConfig) {
    if let Err(e) = slalom_library::PicarVehicle::stop_motors(config) {
        eprintln!("Failed to stop motors: {}", e);
    }
}

#[cfg(not(feature = "raspberry-pi"))]
fn stop_picar_motors(_config: &PicarConfig) {}

/// Wraps a vehicle and stops it when dropped
///
/// Covers early returns with `?` and unwinding panics as well as the normal end
/// of a command.
pub struct StopOnDrop<V: Vehicle> {
    vehicle: V,
}

impl<V: Vehicle> StopOnDrop<V> {
    pub fn new(vehicle: V) -> Self {
        Self { vehicle }
    }
}

impl<V: Vehicle> Drop for StopOnDrop<V> {
    fn drop(&mut self) {
        if let Err(e) = self.vehicle.stop() {
            warn!("failed to stop {} on exit: {}", self.vehicle.name(), e);
        }
    }
}

impl<V: Vehicle> Vehicle for StopOnDrop<V> {
    fn name(&self) -> &str {
        self.vehicle.name()
    }

    fn drive_forward(&mut self, speed: u8) -> SlalomResult<()> {
        self.vehicle.drive_forward(speed)
    }

    fn drive_backward(&mut self, speed: u8) -> SlalomResult<()> {
        self.vehicle.drive_backward(speed)
    }

    fn turn_left(&mut self, speed: u8) -> SlalomResult<()> {
        self.vehicle.turn_left(speed)
    }

    fn turn_right(&mut self, speed: u8) -> SlalomResult<()> {
        self.vehicle.turn_right(speed)
    }

    fn stop(&mut self) -> SlalomResult<()> {
        self.vehicle.stop()
    }

    fn measure_at(&mut self, angle: MastAngle) -> SlalomResult<RangeReading> {
        self.vehicle.measure_at(angle)
    }

    fn aim_mast(&mut self, angle: MastAngle) -> SlalomResult<()> {
        self.vehicle.aim_mast(angle)
    }

    fn pause(&mut self, duration: Duration) {
        self.vehicle.pause(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slalom_core::MotionCommand;
    use slalom_library::{ObstacleScene, ScriptedVehicle};

    /// Shares the command log with the test after the guard is gone
    struct Shared<'a>(&'a mut ScriptedVehicle);

    impl Vehicle for Shared<'_> {
        fn name(&self) -> &str {
            self.0.name()
        }
        fn drive_forward(&mut self, speed: u8) -> SlalomResult<()> {
            self.0.drive_forward(speed)
        }
        fn drive_backward(&mut self, speed: u8) -> SlalomResult<()> {
            self.0.drive_backward(speed)
        }
        fn turn_left(&mut self, speed: u8) -> SlalomResult<()> {
            self.0.turn_left(speed)
        }
        fn turn_right(&mut self, speed: u8) -> SlalomResult<()> {
            self.0.turn_right(speed)
        }
        fn stop(&mut self) -> SlalomResult<()> {
            self.0.stop()
        }
        fn measure_at(&mut self, angle: MastAngle) -> SlalomResult<RangeReading> {
            self.0.measure_at(angle)
        }
    }

    #[test]
    fn test_guard_stops_on_drop() {
        let mut scripted = ScriptedVehicle::new();
        {
            let mut guard = StopOnDrop::new(Shared(&mut scripted));
            guard.drive_forward(10).unwrap();
        }
        assert_eq!(
            scripted.motions(),
            vec![MotionCommand::Forward(10), MotionCommand::Stop]
        );
    }

    #[test]
    fn test_guard_stops_after_error() {
        let mut scripted = ScriptedVehicle::new();
        let result = (|| -> SlalomResult<()> {
            let mut guard = StopOnDrop::new(Shared(&mut scripted));
            guard.turn_left(10)?;
            guard.measure_at(0)?;
            Ok(())
        })();

        assert!(result.is_err());
        assert_eq!(scripted.motions().last(), Some(&MotionCommand::Stop));
    }

    #[test]
    fn test_sim_rejects_long_course() {
        let mut config = SlalomConfig::default();
        config.simulation.obstacles = vec![ObstacleScene::wall_on(slalom_core::Side::Left, 50.0, 20.0)];

        assert!(open_vehicle(Backend::Sim, &config, 2).is_err());
        assert!(open_vehicle(Backend::Sim, &config, 1).is_ok());
    }

    #[cfg(not(feature = "raspberry-pi"))]
    #[test]
    fn test_picar_needs_feature() {
        assert!(open_vehicle(Backend::Picar, &SlalomConfig::default(), 4).is_err());
    }
}
