use crate::algorithms::turn_decision::TurnDecision;
use crate::nodes::navigator::{NavigationReport, ObstacleNavigator};
use slalom_core::{ControlConfig, SlalomResult, Vehicle};
use tracing::info;

/// Reports from every obstacle handled, in course order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseReport {
    pub obstacles: Vec<NavigationReport>,
}

impl CourseReport {
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn decisions(&self) -> Vec<TurnDecision> {
        self.obstacles.iter().map(|r| r.survey.decision).collect()
    }

    /// How many obstacles ended in the given decision
    pub fn count(&self, decision: TurnDecision) -> usize {
        self.obstacles
            .iter()
            .filter(|r| r.survey.decision == decision)
            .count()
    }
}

/// Course Runner - handle a fixed number of obstacles in sequence
///
/// Each obstacle gets a fresh call to the navigator; the only thing linking
/// them is the vehicle's physical heading. The first error ends the course.
pub struct CourseRunner {
    navigator: ObstacleNavigator,
    obstacles: u32,
}

impl CourseRunner {
    /// Fails if `config` does not validate
    pub fn new(config: &ControlConfig, obstacles: u32) -> SlalomResult<Self> {
        Ok(Self {
            navigator: ObstacleNavigator::new(config)?,
            obstacles,
        })
    }

    pub fn obstacles(&self) -> u32 {
        self.obstacles
    }

    pub fn run(&self, vehicle: &mut dyn Vehicle) -> SlalomResult<CourseReport> {
        self.run_with(vehicle, |_, _| {})
    }

    /// Run the course, calling `on_obstacle` after each obstacle is cleared
    pub fn run_with<F>(&self, vehicle: &mut dyn Vehicle, mut on_obstacle: F) -> SlalomResult<CourseReport>
    where
        F: FnMut(u32, &NavigationReport),
    {
        let mut report = CourseReport::default();

        for index in 1..=self.obstacles {
            info!(obstacle = index, total = self.obstacles, "navigating obstacle");
            let obstacle = self.navigator.navigate(vehicle)?;
            on_obstacle(index, &obstacle);
            report.obstacles.push(obstacle);
        }

        info!(obstacles = report.len(), "course complete");
        Ok(report)
    }
}
