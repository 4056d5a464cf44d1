use slalom_core::{MastAngle, MotionCommand, RangeReading, SlalomError, SlalomResult, Vehicle};
use std::collections::VecDeque;
use std::time::Duration;

/// Everything a [`ScriptedVehicle`] was asked to do, in order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptedCommand {
    Motion(MotionCommand),
    Aim(MastAngle),
    Measure(MastAngle, RangeReading),
    Pause(Duration),
}

/// Scripted vehicle - deterministic stand-in for hardware
///
/// Every `measure_at` call pops the next reading from a pre-programmed queue,
/// regardless of the requested angle. Running out of readings is an error so a
/// control loop under test cannot spin forever. Pauses are recorded, not slept.
#[derive(Debug, Default)]
pub struct ScriptedVehicle {
    readings: VecDeque<RangeReading>,
    log: Vec<ScriptedCommand>,
}

impl ScriptedVehicle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vehicle that will return `readings` in order
    pub fn with_readings<I, R>(readings: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RangeReading>,
    {
        let mut vehicle = Self::new();
        vehicle.push_readings(readings);
        vehicle
    }

    /// Append readings to the end of the script
    pub fn push_readings<I, R>(&mut self, readings: I)
    where
        I: IntoIterator<Item = R>,
        R: Into<RangeReading>,
    {
        self.readings.extend(readings.into_iter().map(Into::into));
    }

    /// Readings not yet consumed
    pub fn remaining(&self) -> usize {
        self.readings.len()
    }

    pub fn log(&self) -> &[ScriptedCommand] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Motion commands only, in order
    pub fn motions(&self) -> Vec<MotionCommand> {
        self.log
            .iter()
            .filter_map(|entry| match entry {
                ScriptedCommand::Motion(command) => Some(*command),
                _ => None,
            })
            .collect()
    }

    /// Angles at which a reading was taken, in order
    pub fn measured_angles(&self) -> Vec<MastAngle> {
        self.log
            .iter()
            .filter_map(|entry| match entry {
                ScriptedCommand::Measure(angle, _) => Some(*angle),
                _ => None,
            })
            .collect()
    }

    /// Sum of all recorded pauses
    pub fn paused_total(&self) -> Duration {
        self.log
            .iter()
            .filter_map(|entry| match entry {
                ScriptedCommand::Pause(duration) => Some(*duration),
                _ => None,
            })
            .sum()
    }

    fn record(&mut self, command: MotionCommand) -> SlalomResult<()> {
        self.log.push(ScriptedCommand::Motion(command));
        Ok(())
    }
}

impl Vehicle for ScriptedVehicle {
    fn name(&self) -> &str {
        "scripted"
    }

    fn drive_forward(&mut self, speed: u8) -> SlalomResult<()> {
        self.record(MotionCommand::Forward(speed))
    }

    fn drive_backward(&mut self, speed: u8) -> SlalomResult<()> {
        self.record(MotionCommand::Backward(speed))
    }

    fn turn_left(&mut self, speed: u8) -> SlalomResult<()> {
        self.record(MotionCommand::TurnLeft(speed))
    }

    fn turn_right(&mut self, speed: u8) -> SlalomResult<()> {
        self.record(MotionCommand::TurnRight(speed))
    }

    fn stop(&mut self) -> SlalomResult<()> {
        self.record(MotionCommand::Stop)
    }

    fn measure_at(&mut self, angle: MastAngle) -> SlalomResult<RangeReading> {
        let reading = self.readings.pop_front().ok_or(SlalomError::ScriptExhausted)?;
        self.log.push(ScriptedCommand::Measure(angle, reading));
        Ok(reading)
    }

    fn aim_mast(&mut self, angle: MastAngle) -> SlalomResult<()> {
        self.log.push(ScriptedCommand::Aim(angle));
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.log.push(ScriptedCommand::Pause(duration));
    }
}
