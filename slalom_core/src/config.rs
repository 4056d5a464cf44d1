//! Control parameters for the obstacle-course loop
//!
//! Every number the control loop depends on lives here so it can be tuned from
//! the config file instead of the source. Defaults are the values the course was
//! tuned with on a PiCar-4WD.

use crate::error::{SlalomError, SlalomResult};
use crate::hal::{MastAngle, Side, MAST_LIMIT_DEGREES};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete set of control-loop parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub drive: DriveConfig,
    pub approach: ApproachConfig,
    pub scan: ScanConfig,
    pub turn: TurnConfig,
}

impl ControlConfig {
    /// Check cross-field constraints. Called after loading from a file.
    pub fn validate(&self) -> SlalomResult<()> {
        self.drive.validate()?;
        self.approach.validate()?;
        self.scan.validate()?;

        if self.scan.outlier_distance_cm <= self.approach.stop_distance_cm {
            return Err(SlalomError::config(format!(
                "outlier distance ({} cm) must exceed the stop distance ({} cm)",
                self.scan.outlier_distance_cm, self.approach.stop_distance_cm
            )));
        }

        Ok(())
    }
}

/// Drive train settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Motor power in percent, used for both driving and turning
    pub speed: u8,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self { speed: 10 }
    }
}

impl DriveConfig {
    fn validate(&self) -> SlalomResult<()> {
        if self.speed == 0 || self.speed > 100 {
            return Err(SlalomError::config(format!(
                "drive speed must be within 1..=100, got {}",
                self.speed
            )));
        }
        Ok(())
    }
}

/// Approach phase settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproachConfig {
    /// Stop once a valid reading is at or below this distance
    pub stop_distance_cm: f64,

    /// Delay between forward-range polls
    pub poll_interval_ms: u64,

    /// Delay after pointing the mast forward, before the first poll
    pub mast_settle_ms: u64,

    /// Give up after this many polls. `None` keeps driving until blocked.
    pub max_polls: Option<u64>,
}

impl Default for ApproachConfig {
    fn default() -> Self {
        Self {
            stop_distance_cm: 20.0,
            poll_interval_ms: 250,
            mast_settle_ms: 500,
            max_polls: None,
        }
    }
}

impl ApproachConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn mast_settle(&self) -> Duration {
        Duration::from_millis(self.mast_settle_ms)
    }

    fn validate(&self) -> SlalomResult<()> {
        if !(self.stop_distance_cm >= 0.0) {
            return Err(SlalomError::config(format!(
                "stop distance must be non-negative, got {}",
                self.stop_distance_cm
            )));
        }
        if self.max_polls == Some(0) {
            return Err(SlalomError::config("approach max_polls must be at least 1"));
        }
        Ok(())
    }
}

/// Angular range swept on one side of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcConfig {
    pub min_angle: MastAngle,
    pub max_angle: MastAngle,
    pub step: MastAngle,
}

impl ArcConfig {
    pub const fn new(min_angle: MastAngle, max_angle: MastAngle, step: MastAngle) -> Self {
        Self {
            min_angle,
            max_angle,
            step,
        }
    }

    /// Default left arc: 80° to 90° in 2° steps
    pub const fn default_left() -> Self {
        Self::new(80, 90, 2)
    }

    /// Default right arc: -90° to -80° in 2° steps
    pub const fn default_right() -> Self {
        Self::new(-90, -80, 2)
    }

    /// Angles visited by a sweep, in order. The max boundary is skipped when the
    /// step overshoots it. A non-positive step visits nothing.
    pub fn angles(&self) -> impl Iterator<Item = MastAngle> {
        let max = self.max_angle;
        let step = self.step;
        let first = (step > 0).then_some(self.min_angle);
        std::iter::successors(first, move |angle| angle.checked_add(step))
            .take_while(move |angle| *angle <= max)
    }

    /// Number of samples a sweep produces, always equal to `angles().count()`
    pub fn sample_count(&self) -> usize {
        if self.step <= 0 || self.max_angle < self.min_angle {
            return 0;
        }
        let span = i64::from(self.max_angle) - i64::from(self.min_angle);
        (span / i64::from(self.step)) as usize + 1
    }

    pub fn validate(&self, side: Side) -> SlalomResult<()> {
        if self.step <= 0 {
            return Err(SlalomError::config(format!(
                "{} arc step must be positive, got {}",
                side, self.step
            )));
        }
        if self.min_angle > self.max_angle {
            return Err(SlalomError::config(format!(
                "{} arc is empty: min angle {} exceeds max angle {}",
                side, self.min_angle, self.max_angle
            )));
        }
        for angle in [self.min_angle, self.max_angle] {
            if angle.abs() > MAST_LIMIT_DEGREES {
                return Err(SlalomError::config(format!(
                    "{} arc angle {} is outside the mast range ±{}",
                    side, angle, MAST_LIMIT_DEGREES
                )));
            }
        }
        Ok(())
    }
}

/// Side-scan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Delay after each mast move, letting the servo travel and the echo finish
    pub settle_ms: u64,

    /// Distance substituted for sentinel readings before averaging
    pub outlier_distance_cm: f64,

    pub left: ArcConfig,
    pub right: ArcConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            settle_ms: 250,
            outlier_distance_cm: 100.0,
            left: ArcConfig::default_left(),
            right: ArcConfig::default_right(),
        }
    }
}

impl ScanConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn arc(&self, side: Side) -> ArcConfig {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn validate(&self) -> SlalomResult<()> {
        self.left.validate(Side::Left)?;
        self.right.validate(Side::Right)?;
        if !self.outlier_distance_cm.is_finite() {
            return Err(SlalomError::config("outlier distance must be finite"));
        }
        Ok(())
    }
}

/// Open-loop turn settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    /// How long the turn command is held. Tuned by trial for roughly 90°.
    pub hold_ms: u64,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self { hold_ms: 1750 }
    }
}

impl TurnConfig {
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

/// Course-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseConfig {
    /// Obstacles handled in sequence
    pub obstacles: u32,

    /// Wait before the first obstacle, time to start recording
    pub start_delay_ms: u64,

    /// Dance at the end of the course
    pub finale: bool,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            obstacles: 4,
            start_delay_ms: 5000,
            finale: true,
        }
    }
}

impl CourseConfig {
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ControlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.drive.speed, 10);
        assert_eq!(config.approach.stop_distance_cm, 20.0);
        assert_eq!(config.turn.hold(), Duration::from_millis(1750));
        assert_eq!(config.approach.max_polls, None);

        let course = CourseConfig::default();
        assert_eq!(course.obstacles, 4);
        assert_eq!(course.start_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_default_arcs() {
        let scan = ScanConfig::default();
        assert_eq!(scan.left.angles().collect::<Vec<_>>(), vec![80, 82, 84, 86, 88, 90]);
        assert_eq!(
            scan.right.angles().collect::<Vec<_>>(),
            vec![-90, -88, -86, -84, -82, -80]
        );
        assert_eq!(scan.left.sample_count(), 6);
    }

    #[test]
    fn test_overshooting_step_skips_max() {
        let arc = ArcConfig::new(80, 90, 3);
        assert_eq!(arc.angles().collect::<Vec<_>>(), vec![80, 83, 86, 89]);
        assert_eq!(arc.sample_count(), 4);
    }

    #[test]
    fn test_single_angle_arc() {
        let arc = ArcConfig::new(45, 45, 5);
        assert_eq!(arc.angles().collect::<Vec<_>>(), vec![45]);
        assert!(arc.validate(Side::Left).is_ok());
    }

    #[test]
    fn test_reject_empty_arc() {
        let arc = ArcConfig::new(90, 80, 2);
        assert_eq!(arc.sample_count(), 0);
        assert!(matches!(arc.validate(Side::Left), Err(SlalomError::Config(_))));
    }

    #[test]
    fn test_reject_zero_step() {
        let arc = ArcConfig::new(80, 90, 0);
        assert!(arc.validate(Side::Right).is_err());
    }

    #[test]
    fn test_non_positive_step_visits_nothing() {
        for step in [0, -2] {
            let arc = ArcConfig::new(80, 90, step);
            assert_eq!(arc.angles().count(), 0);
            assert_eq!(arc.sample_count(), 0);
        }
    }

    #[test]
    fn test_extreme_bounds_do_not_overflow() {
        let arc = ArcConfig::new(MastAngle::MIN, MastAngle::MAX, MastAngle::MAX);
        assert_eq!(arc.sample_count(), 3);
        assert_eq!(
            arc.angles().collect::<Vec<_>>(),
            vec![MastAngle::MIN, -1, MastAngle::MAX - 1]
        );
        assert!(arc.validate(Side::Left).is_err());
    }

    #[test]
    fn test_reject_out_of_range_angle() {
        let arc = ArcConfig::new(80, 100, 2);
        assert!(arc.validate(Side::Left).is_err());
    }

    #[test]
    fn test_outlier_must_exceed_stop_distance() {
        let mut config = ControlConfig::default();
        config.scan.outlier_distance_cm = 15.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_bad_speed() {
        let mut config = ControlConfig::default();
        config.drive.speed = 0;
        assert!(config.validate().is_err());

        config.drive.speed = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ControlConfig = toml::from_str(
            r#"
            [drive]
            speed = 25

            [scan.left]
            min_angle = 60
            max_angle = 90
            step = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.drive.speed, 25);
        assert_eq!(config.scan.left, ArcConfig::new(60, 90, 5));
        assert_eq!(config.scan.right, ArcConfig::default_right());
        assert_eq!(config.approach, ApproachConfig::default());
    }
}
