use crate::backend::{open_vehicle, Backend, StopOnDrop};
use crate::config::SlalomConfig;
use anyhow::{Context, Result};
use colored::*;
use slalom_core::Vehicle;
use slalom_library::{CourseReport, CourseRunner, Finale, NavigationReport, TurnDecision};
use tracing::info;

/// Overrides for a single `slalom run`
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Obstacle count, instead of `course.obstacles`
    pub obstacles: Option<u32>,
    pub skip_finale: bool,
    /// Start immediately instead of waiting `course.start_delay_ms`
    pub no_delay: bool,
}

pub fn execute_run(
    config: &SlalomConfig,
    backend: Backend,
    options: &RunOptions,
) -> Result<CourseReport> {
    let obstacles = options.obstacles.unwrap_or(config.course.obstacles);
    let mut vehicle = StopOnDrop::new(open_vehicle(backend, config, obstacles)?);

    println!(
        "{} Running {} obstacle(s) on {}",
        "→".cyan(),
        obstacles,
        vehicle.name().bold()
    );

    let delay = config.course.start_delay();
    if !options.no_delay && !delay.is_zero() {
        info!(delay_ms = config.course.start_delay_ms, "waiting before start");
        println!("{} Starting in {:.1}s", "→".cyan(), delay.as_secs_f64());
        vehicle.pause(delay);
    }

    let runner =
        CourseRunner::new(&config.control, obstacles).context("Invalid control config")?;
    let report = runner
        .run_with(&mut vehicle, print_obstacle)
        .context("Course aborted")?;

    if config.course.finale && !options.skip_finale {
        Finale::new(config.control.drive.speed)
            .perform(&mut vehicle)
            .context("Finale failed")?;
    }

    print_summary(&report);
    Ok(report)
}

pub(crate) fn format_decision(decision: TurnDecision) -> ColoredString {
    match decision {
        TurnDecision::Left => "turn left".green(),
        TurnDecision::Right => "turn right".green(),
        TurnDecision::Undecided => "no turn".yellow(),
    }
}

fn print_obstacle(index: u32, report: &NavigationReport) {
    println!(
        "  [{}] approach {} polls, left {}, right {} -> {}",
        index,
        report.approach_polls,
        report.survey.left_clearance,
        report.survey.right_clearance,
        format_decision(report.survey.decision)
    );
}

fn print_summary(report: &CourseReport) {
    println!(
        "{} Course complete: {} obstacle(s), {} left, {} right, {} undecided",
        "✓".green(),
        report.len(),
        report.count(TurnDecision::Left),
        report.count(TurnDecision::Right),
        report.count(TurnDecision::Undecided)
    );
}
