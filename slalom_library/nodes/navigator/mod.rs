use crate::algorithms::clearance::{ClearanceEstimate, ClearanceEstimator};
use crate::algorithms::range_filter::RangeFilter;
use crate::algorithms::turn_decision::{decide, TurnDecision};
use crate::nodes::approach::ApproachController;
use crate::nodes::arc_scanner::{ArcScan, ArcScanner};
use slalom_core::{ArcConfig, ControlConfig, Side, SlalomResult, Vehicle};
use std::time::Duration;
use tracing::{debug, info};

/// Both side scans and the decision drawn from them
#[derive(Debug, Clone, PartialEq)]
pub struct Survey {
    pub left_scan: ArcScan,
    pub right_scan: ArcScan,
    pub left_clearance: ClearanceEstimate,
    pub right_clearance: ClearanceEstimate,
    pub decision: TurnDecision,
}

/// What happened at one obstacle
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationReport {
    /// Forward-range polls taken during the approach
    pub approach_polls: u64,
    pub survey: Survey,
}

/// Obstacle Navigator - handle one obstacle from approach to turn
///
/// Sequence, strictly in order:
/// 1. approach until blocked and stop
/// 2. sweep the left arc, then the right arc
/// 3. average each side and decide
/// 4. turn for the fixed hold time (or stay put when undecided), then stop
///
/// The navigator holds configuration only, so consecutive calls are independent.
pub struct ObstacleNavigator {
    speed: u8,
    approach: ApproachController,
    scanner: ArcScanner,
    estimator: ClearanceEstimator,
    left_arc: ArcConfig,
    right_arc: ArcConfig,
    turn_hold: Duration,
}

impl ObstacleNavigator {
    /// Build a navigator from `config`, rejecting it if it fails validation
    pub fn new(config: &ControlConfig) -> SlalomResult<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: &ControlConfig) -> Self {
        Self {
            speed: config.drive.speed,
            approach: ApproachController::new(config.drive.speed, &config.approach),
            scanner: ArcScanner::new(config.scan.settle()),
            estimator: ClearanceEstimator::new(RangeFilter::new(config.scan.outlier_distance_cm)),
            left_arc: config.scan.left,
            right_arc: config.scan.right,
            turn_hold: config.turn.hold(),
        }
    }

    pub fn approach(&self) -> &ApproachController {
        &self.approach
    }

    /// Scan both sides from a standstill and decide, without moving
    pub fn survey(&self, vehicle: &mut dyn Vehicle) -> SlalomResult<Survey> {
        let left_scan = self.scanner.scan(vehicle, Side::Left, &self.left_arc)?;
        let right_scan = self.scanner.scan(vehicle, Side::Right, &self.right_arc)?;

        let left_clearance = self.estimator.estimate(Side::Left, &left_scan.readings())?;
        let right_clearance = self.estimator.estimate(Side::Right, &right_scan.readings())?;
        let decision = decide(left_clearance, right_clearance);

        info!(
            left_mean = %left_clearance,
            right_mean = %right_clearance,
            %decision,
            "turn decision"
        );

        Ok(Survey {
            left_scan,
            right_scan,
            left_clearance,
            right_clearance,
            decision,
        })
    }

    /// Execute the open-loop turn for `decision` and stop
    pub fn turn(&self, vehicle: &mut dyn Vehicle, decision: TurnDecision) -> SlalomResult<()> {
        match decision {
            TurnDecision::Left => vehicle.turn_left(self.speed)?,
            TurnDecision::Right => vehicle.turn_right(self.speed)?,
            TurnDecision::Undecided => debug!("sides measured equal, not turning"),
        }

        // No heading feedback: hold for the time a quarter turn takes
        vehicle.pause(self.turn_hold);
        vehicle.stop()
    }

    /// Handle one obstacle end to end
    pub fn navigate(&self, vehicle: &mut dyn Vehicle) -> SlalomResult<NavigationReport> {
        let approach_polls = self.approach.run(vehicle)?;
        let survey = self.survey(vehicle)?;
        self.turn(vehicle, survey.decision)?;

        Ok(NavigationReport {
            approach_polls,
            survey,
        })
    }
}

impl Default for ObstacleNavigator {
    fn default() -> Self {
        Self::from_valid(&ControlConfig::default())
    }
}
