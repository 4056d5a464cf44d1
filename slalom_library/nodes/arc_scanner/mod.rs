use slalom_core::{ArcConfig, MastAngle, RangeReading, Side, SlalomResult, Vehicle};
use std::time::Duration;
use tracing::{debug, trace};

/// One reading taken during a sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanSample {
    pub angle: MastAngle,
    pub reading: RangeReading,
}

/// Raw readings from one sweep, ordered by increasing mast angle
#[derive(Debug, Clone, PartialEq)]
pub struct ArcScan {
    side: Side,
    samples: Vec<ScanSample>,
}

impl ArcScan {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            samples: Vec::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn push(&mut self, angle: MastAngle, reading: RangeReading) {
        self.samples.push(ScanSample { angle, reading });
    }

    pub fn samples(&self) -> &[ScanSample] {
        &self.samples
    }

    pub fn angles(&self) -> Vec<MastAngle> {
        self.samples.iter().map(|s| s.angle).collect()
    }

    /// Raw readings in sweep order, sentinels included
    pub fn readings(&self) -> Vec<RangeReading> {
        self.samples.iter().map(|s| s.reading).collect()
    }

    /// Number of readings that came back as sentinels
    pub fn sentinel_count(&self) -> usize {
        self.samples.iter().filter(|s| s.reading.is_sentinel()).count()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Arc Scanner - sweep the mast across one side and record distances
///
/// The mast is first brought to the start of the arc and given time to get
/// there. Each step then takes a reading, records it, and waits the settle time
/// before the next move so the servo and the echo have finished. Readings are
/// returned raw; filtering happens at aggregation.
pub struct ArcScanner {
    settle: Duration,
}

impl ArcScanner {
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }

    /// Sweep `arc` and return every sample in order
    ///
    /// A malformed arc is rejected before the mast moves.
    pub fn scan(&self, vehicle: &mut dyn Vehicle, side: Side, arc: &ArcConfig) -> SlalomResult<ArcScan> {
        arc.validate(side)?;
        let mut scan = ArcScan::new(side);

        vehicle.aim_mast(arc.min_angle)?;
        vehicle.pause(self.settle);

        for angle in arc.angles() {
            let reading = vehicle.measure_at(angle)?;
            trace!(%side, angle, %reading, "scan reading");
            scan.push(angle, reading);
            vehicle.pause(self.settle);
        }

        debug!(
            %side,
            samples = scan.len(),
            sentinels = scan.sentinel_count(),
            "arc scan complete"
        );
        Ok(scan)
    }
}

impl Default for ArcScanner {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::scripted::{ScriptedCommand, ScriptedVehicle};
    use slalom_core::SlalomError;

    #[test]
    fn test_default_left_arc() {
        let scanner = ArcScanner::default();
        let mut vehicle = ScriptedVehicle::with_readings([30, 31, -1, 33, 34, 35]);

        let scan = scanner
            .scan(&mut vehicle, Side::Left, &ArcConfig::default_left())
            .unwrap();

        assert_eq!(scan.side(), Side::Left);
        assert_eq!(scan.angles(), vec![80, 82, 84, 86, 88, 90]);
        assert_eq!(scan.readings()[2], RangeReading::NO_ECHO);
        assert_eq!(scan.sentinel_count(), 1);
        assert_eq!(vehicle.remaining(), 0);
    }

    #[test]
    fn test_sample_count_matches_arc() {
        let scanner = ArcScanner::default();
        let arcs = [
            ArcConfig::new(-90, -80, 2),
            ArcConfig::new(0, 10, 5),
            ArcConfig::new(10, 20, 3),
            ArcConfig::new(-30, 30, 7),
            ArcConfig::new(45, 45, 1),
        ];

        for arc in arcs {
            let mut vehicle = ScriptedVehicle::with_readings(vec![50; 64]);
            let scan = scanner.scan(&mut vehicle, Side::Right, &arc).unwrap();

            let expected = ((arc.max_angle - arc.min_angle) / arc.step) as usize + 1;
            assert_eq!(scan.len(), expected);

            let angles = scan.angles();
            assert_eq!(angles[0], arc.min_angle);
            assert!(angles.iter().all(|a| *a <= arc.max_angle));
            assert!(angles.windows(2).all(|w| w[1] - w[0] == arc.step));
        }
    }

    #[test]
    fn test_overshooting_step_skips_max() {
        let scanner = ArcScanner::default();
        let mut vehicle = ScriptedVehicle::with_readings(vec![50; 8]);

        let scan = scanner
            .scan(&mut vehicle, Side::Left, &ArcConfig::new(80, 90, 4))
            .unwrap();

        assert_eq!(scan.angles(), vec![80, 84, 88]);
    }

    #[test]
    fn test_positions_and_settles_before_first_reading() {
        let scanner = ArcScanner::new(Duration::from_millis(100));
        let mut vehicle = ScriptedVehicle::with_readings([40, 41]);

        scanner
            .scan(&mut vehicle, Side::Left, &ArcConfig::new(10, 12, 2))
            .unwrap();

        let settle = ScriptedCommand::Pause(Duration::from_millis(100));
        assert_eq!(
            vehicle.log(),
            &[
                ScriptedCommand::Aim(10),
                settle,
                ScriptedCommand::Measure(10, RangeReading::from(40)),
                settle,
                ScriptedCommand::Measure(12, RangeReading::from(41)),
                settle,
            ]
        );
    }

    #[test]
    fn test_sweep_issues_no_motion() {
        let scanner = ArcScanner::default();
        let mut vehicle = ScriptedVehicle::with_readings(vec![-2; 6]);

        scanner
            .scan(&mut vehicle, Side::Right, &ArcConfig::default_right())
            .unwrap();

        assert!(vehicle.motions().is_empty());
    }

    #[test]
    fn test_zero_step_is_rejected_before_measuring() {
        let scanner = ArcScanner::default();
        let mut vehicle = ScriptedVehicle::with_readings(vec![50; 16]);

        let result = scanner.scan(&mut vehicle, Side::Left, &ArcConfig::new(80, 90, 0));

        assert!(matches!(result, Err(SlalomError::Config(_))));
        assert!(vehicle.log().is_empty());
        assert_eq!(vehicle.remaining(), 16);
    }

    #[test]
    fn test_negative_step_is_rejected_before_measuring() {
        let scanner = ArcScanner::default();
        let mut vehicle = ScriptedVehicle::with_readings(vec![50; 16]);

        let result = scanner.scan(&mut vehicle, Side::Right, &ArcConfig::new(-90, -80, -2));

        assert!(matches!(result, Err(SlalomError::Config(_))));
        assert!(vehicle.measured_angles().is_empty());
    }

    #[test]
    fn test_arc_past_mast_limit_is_rejected() {
        let scanner = ArcScanner::default();
        let mut vehicle = ScriptedVehicle::with_readings(vec![50; 16]);

        let result = scanner.scan(&mut vehicle, Side::Left, &ArcConfig::new(80, 100, 2));

        assert!(matches!(result, Err(SlalomError::Config(_))));
        assert!(vehicle.log().is_empty());
    }
}
