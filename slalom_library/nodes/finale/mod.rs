use slalom_core::{MotionCommand, SlalomResult, Vehicle};
use std::time::Duration;
use tracing::debug;

/// One timed move of the closing dance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinaleStep {
    pub command: MotionCommand,
    pub hold: Duration,
}

impl FinaleStep {
    pub const fn new(command: MotionCommand, hold: Duration) -> Self {
        Self { command, hold }
    }
}

/// Finale - a short back-and-forth shuffle after the last obstacle
///
/// Purely cosmetic; it reads no sensors. The table always ends with a stop.
pub struct Finale {
    steps: Vec<FinaleStep>,
}

impl Finale {
    pub fn new(speed: u8) -> Self {
        use MotionCommand::{Backward, Forward, Stop};

        let table: [(MotionCommand, u64); 12] = [
            (Forward(speed), 2500),
            (Backward(speed), 500),
            (Forward(speed), 250),
            (Backward(speed), 250),
            (Forward(speed), 250),
            (Stop, 500),
            (Forward(speed), 500),
            (Backward(speed), 500),
            (Forward(speed), 250),
            (Backward(speed), 250),
            (Forward(speed), 250),
            (Stop, 0),
        ];

        Self {
            steps: table
                .into_iter()
                .map(|(command, ms)| FinaleStep::new(command, Duration::from_millis(ms)))
                .collect(),
        }
    }

    pub fn steps(&self) -> &[FinaleStep] {
        &self.steps
    }

    /// Total time the dance takes
    pub fn duration(&self) -> Duration {
        self.steps.iter().map(|step| step.hold).sum()
    }

    pub fn perform(&self, vehicle: &mut dyn Vehicle) -> SlalomResult<()> {
        debug!(steps = self.steps.len(), "finale");
        for step in &self.steps {
            vehicle.apply(step.command)?;
            if !step.hold.is_zero() {
                vehicle.pause(step.hold);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::scripted::ScriptedVehicle;

    #[test]
    fn test_choreography() {
        let finale = Finale::new(10);
        let mut vehicle = ScriptedVehicle::new();

        finale.perform(&mut vehicle).unwrap();

        let motions = vehicle.motions();
        assert_eq!(motions.len(), 12);
        assert_eq!(motions[0], MotionCommand::Forward(10));
        assert_eq!(motions[1], MotionCommand::Backward(10));
        assert_eq!(motions[5], MotionCommand::Stop);
        assert_eq!(motions.last(), Some(&MotionCommand::Stop));
        assert_eq!(vehicle.paused_total(), Duration::from_millis(6000));
        assert_eq!(vehicle.remaining(), 0);
    }

    #[test]
    fn test_duration() {
        assert_eq!(Finale::new(30).duration(), Duration::from_secs(6));
    }

    #[test]
    fn test_uses_given_speed() {
        let finale = Finale::new(40);
        assert!(finale.steps().iter().all(|step| match step.command {
            MotionCommand::Forward(speed) | MotionCommand::Backward(speed) => speed == 40,
            _ => true,
        }));
    }
}
