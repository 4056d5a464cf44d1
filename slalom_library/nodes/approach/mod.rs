use slalom_core::{ApproachConfig, RangeReading, SlalomError, SlalomResult, Vehicle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Mast angle that faces straight ahead
const FORWARD: i32 = 0;

/// Approach Controller - drive forward until an obstacle is close
///
/// Points the mast forward, then keeps commanding forward motion while polling
/// the forward range. The first valid reading at or below the stop distance ends
/// the approach. Sentinel readings mean "no echo" and never stop the vehicle.
///
/// Unless `max_polls` is configured there is no bound on the number of polls: an
/// obstacle that never produces a close valid echo keeps the vehicle driving.
pub struct ApproachController {
    speed: u8,
    stop_distance_cm: f64,
    poll_interval: Duration,
    mast_settle: Duration,
    max_polls: Option<u64>,
}

impl ApproachController {
    pub fn new(speed: u8, config: &ApproachConfig) -> Self {
        Self {
            speed,
            stop_distance_cm: config.stop_distance_cm,
            poll_interval: config.poll_interval(),
            mast_settle: config.mast_settle(),
            max_polls: config.max_polls,
        }
    }

    /// Set the stop threshold in centimeters
    pub fn set_stop_distance(&mut self, cm: f64) {
        self.stop_distance_cm = cm;
    }

    /// Bound the number of polls (`None` = unbounded)
    pub fn set_max_polls(&mut self, max_polls: Option<u64>) {
        self.max_polls = max_polls;
    }

    pub fn stop_distance_cm(&self) -> f64 {
        self.stop_distance_cm
    }

    /// Whether a reading ends the approach
    pub fn is_blocked(&self, reading: RangeReading) -> bool {
        reading
            .valid_cm()
            .is_some_and(|cm| cm <= self.stop_distance_cm)
    }

    /// Drive until blocked, then stop. Returns the number of polls taken.
    pub fn run(&self, vehicle: &mut dyn Vehicle) -> SlalomResult<u64> {
        vehicle.aim_mast(FORWARD)?;
        vehicle.pause(self.mast_settle);

        let mut polls: u64 = 0;
        loop {
            vehicle.drive_forward(self.speed)?;
            let reading = vehicle.measure_at(FORWARD)?;
            polls += 1;
            trace!(poll = polls, %reading, "approach reading");

            if self.is_blocked(reading) {
                break;
            }

            if self.max_polls.is_some_and(|max| polls >= max) {
                warn!(
                    polls,
                    stop_distance_cm = self.stop_distance_cm,
                    "approach gave up before reaching an obstacle"
                );
                vehicle.stop()?;
                return Err(SlalomError::ApproachTimeout {
                    polls,
                    stop_distance_cm: self.stop_distance_cm,
                });
            }

            vehicle.pause(self.poll_interval);
        }

        vehicle.stop()?;
        debug!(polls, "approach stopped at obstacle");
        Ok(polls)
    }
}

impl Default for ApproachController {
    fn default() -> Self {
        Self::new(10, &ApproachConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::scripted::{ScriptedCommand, ScriptedVehicle};
    use slalom_core::MotionCommand;

    #[test]
    fn test_stops_on_first_close_valid_reading() {
        let controller = ApproachController::default();
        let mut vehicle = ScriptedVehicle::with_readings([-1, -1, 45, 30, 19, 5]);

        let polls = controller.run(&mut vehicle).unwrap();

        assert_eq!(polls, 5);
        // the trailing 5 is never read
        assert_eq!(vehicle.remaining(), 1);
        assert_eq!(vehicle.motions().last(), Some(&MotionCommand::Stop));

        let stops = vehicle
            .motions()
            .iter()
            .filter(|m| **m == MotionCommand::Stop)
            .count();
        assert_eq!(stops, 1);
    }

    #[test]
    fn test_forward_before_every_poll() {
        let controller = ApproachController::default();
        let mut vehicle = ScriptedVehicle::with_readings([50, 40, 20]);

        controller.run(&mut vehicle).unwrap();

        assert_eq!(
            vehicle.motions(),
            vec![
                MotionCommand::Forward(10),
                MotionCommand::Forward(10),
                MotionCommand::Forward(10),
                MotionCommand::Stop,
            ]
        );
        assert_eq!(vehicle.measured_angles(), vec![0, 0, 0]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let controller = ApproachController::default();
        assert!(controller.is_blocked(RangeReading::from(20)));
        assert!(controller.is_blocked(RangeReading::from(0)));
        assert!(!controller.is_blocked(RangeReading::from(20.01)));
        assert!(!controller.is_blocked(RangeReading::NO_ECHO));
        assert!(!controller.is_blocked(RangeReading::ECHO_TIMEOUT));
    }

    #[test]
    fn test_mast_settles_before_polling() {
        let controller = ApproachController::default();
        let mut vehicle = ScriptedVehicle::with_readings([10]);

        controller.run(&mut vehicle).unwrap();

        assert_eq!(vehicle.log()[0], ScriptedCommand::Aim(0));
        assert_eq!(
            vehicle.log()[1],
            ScriptedCommand::Pause(Duration::from_millis(500))
        );
    }

    #[test]
    fn test_poll_interval_between_polls() {
        let controller = ApproachController::default();
        let mut vehicle = ScriptedVehicle::with_readings([-2, 60, 15]);

        controller.run(&mut vehicle).unwrap();

        // 500ms settle + 2 x 250ms between the three polls
        assert_eq!(vehicle.paused_total(), Duration::from_millis(1000));
    }

    #[test]
    fn test_unbounded_by_default() {
        let controller = ApproachController::default();
        let mut vehicle = ScriptedVehicle::with_readings(vec![-1; 500]);

        // only the exhausted script ends this
        let result = controller.run(&mut vehicle);
        assert!(matches!(result, Err(SlalomError::ScriptExhausted)));
        assert_eq!(vehicle.remaining(), 0);
    }

    #[test]
    fn test_max_polls_aborts_with_stop() {
        let mut controller = ApproachController::default();
        controller.set_max_polls(Some(3));
        let mut vehicle = ScriptedVehicle::with_readings([-1, 80, -2, 10]);

        let result = controller.run(&mut vehicle);

        assert!(matches!(
            result,
            Err(SlalomError::ApproachTimeout { polls: 3, .. })
        ));
        assert_eq!(vehicle.motions().last(), Some(&MotionCommand::Stop));
        assert_eq!(vehicle.remaining(), 1);
    }

    #[test]
    fn test_custom_stop_distance() {
        let mut controller = ApproachController::default();
        controller.set_stop_distance(50.0);
        assert_eq!(controller.stop_distance_cm(), 50.0);
        let mut vehicle = ScriptedVehicle::with_readings([70, 45]);

        assert_eq!(controller.run(&mut vehicle).unwrap(), 2);
    }
}
