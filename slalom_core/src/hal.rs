// Vehicle abstraction layer: the only surface through which the control loop
// touches motors, the mast servo and the ranging sensor.

use crate::error::SlalomResult;
use std::fmt;
use std::time::Duration;

/// Mast position in whole degrees. Positive is left, negative is right, 0 faces forward.
pub type MastAngle = i32;

/// Physical travel limit of the mast servo in either direction
pub const MAST_LIMIT_DEGREES: MastAngle = 90;

/// A single distance reading from the ranging sensor, in centimeters.
///
/// Negative values are sentinel codes, never physical distances. NaN is treated
/// the same way.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct RangeReading(f64);

impl RangeReading {
    /// The echo never started before the sensor timeout
    pub const NO_ECHO: Self = Self(-1.0);

    /// The echo started but did not end before the sensor timeout (out of range)
    pub const ECHO_TIMEOUT: Self = Self(-2.0);

    pub const fn from_cm(cm: f64) -> Self {
        Self(cm)
    }

    /// Raw value as reported by the sensor, sentinel codes included
    pub fn raw_cm(self) -> f64 {
        self.0
    }

    pub fn is_sentinel(self) -> bool {
        // NaN fails the comparison and lands here too
        !(self.0 >= 0.0)
    }

    /// Distance in centimeters, or `None` for a sentinel
    pub fn valid_cm(self) -> Option<f64> {
        if self.is_sentinel() {
            None
        } else {
            Some(self.0)
        }
    }
}

impl From<f64> for RangeReading {
    fn from(cm: f64) -> Self {
        Self(cm)
    }
}

impl From<i32> for RangeReading {
    fn from(cm: i32) -> Self {
        Self(cm as f64)
    }
}

impl fmt::Display for RangeReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NO_ECHO {
            write!(f, "no-echo")
        } else if *self == Self::ECHO_TIMEOUT {
            write!(f, "echo-timeout")
        } else if self.is_sentinel() {
            write!(f, "invalid({})", self.0)
        } else {
            write!(f, "{:.2}cm", self.0)
        }
    }
}

/// Side of the vehicle a scan arc covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Velocity command for the drive train. Speeds are percentages (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionCommand {
    Forward(u8),
    Backward(u8),
    TurnLeft(u8),
    TurnRight(u8),
    Stop,
}

/// Capability interface to the vehicle.
///
/// Every call blocks until the hardware has accepted the command. Sentinel range
/// readings are returned as data; `Err` is reserved for I/O failures of the
/// underlying bus or pins.
pub trait Vehicle {
    /// Driver name for logs
    fn name(&self) -> &str;

    fn drive_forward(&mut self, speed: u8) -> SlalomResult<()>;

    fn drive_backward(&mut self, speed: u8) -> SlalomResult<()>;

    /// Pivot counter-clockwise in place
    fn turn_left(&mut self, speed: u8) -> SlalomResult<()>;

    /// Pivot clockwise in place
    fn turn_right(&mut self, speed: u8) -> SlalomResult<()>;

    fn stop(&mut self) -> SlalomResult<()>;

    /// Move the mast to `angle` and take one distance reading there
    fn measure_at(&mut self, angle: MastAngle) -> SlalomResult<RangeReading>;

    /// Move the mast to `angle` without keeping a reading
    fn aim_mast(&mut self, angle: MastAngle) -> SlalomResult<()> {
        self.measure_at(angle).map(|_| ())
    }

    /// Block for `duration`. Simulated and scripted vehicles override this so
    /// time does not pass on the wall clock.
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    /// Dispatch a [`MotionCommand`] to the matching primitive
    fn apply(&mut self, command: MotionCommand) -> SlalomResult<()> {
        match command {
            MotionCommand::Forward(speed) => self.drive_forward(speed),
            MotionCommand::Backward(speed) => self.drive_backward(speed),
            MotionCommand::TurnLeft(speed) => self.turn_left(speed),
            MotionCommand::TurnRight(speed) => self.turn_right(speed),
            MotionCommand::Stop => self.stop(),
        }
    }
}

impl<V: Vehicle + ?Sized> Vehicle for Box<V> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn drive_forward(&mut self, speed: u8) -> SlalomResult<()> {
        (**self).drive_forward(speed)
    }

    fn drive_backward(&mut self, speed: u8) -> SlalomResult<()> {
        (**self).drive_backward(speed)
    }

    fn turn_left(&mut self, speed: u8) -> SlalomResult<()> {
        (**self).turn_left(speed)
    }

    fn turn_right(&mut self, speed: u8) -> SlalomResult<()> {
        (**self).turn_right(speed)
    }

    fn stop(&mut self) -> SlalomResult<()> {
        (**self).stop()
    }

    fn measure_at(&mut self, angle: MastAngle) -> SlalomResult<RangeReading> {
        (**self).measure_at(angle)
    }

    fn aim_mast(&mut self, angle: MastAngle) -> SlalomResult<()> {
        (**self).aim_mast(angle)
    }

    fn pause(&mut self, duration: Duration) {
        (**self).pause(duration)
    }
}
