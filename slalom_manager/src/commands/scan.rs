use crate::backend::{open_vehicle, Backend, StopOnDrop};
use crate::commands::run::format_decision;
use crate::config::SlalomConfig;
use anyhow::{Context, Result};
use colored::*;
use slalom_library::{ArcScan, ObstacleNavigator, Survey};

/// Sweep both arcs from where the vehicle stands and print what it sees
///
/// With `approach`, drive up to the obstacle first. The vehicle never turns.
pub fn execute_scan(config: &SlalomConfig, backend: Backend, approach: bool) -> Result<Survey> {
    let mut vehicle = StopOnDrop::new(open_vehicle(backend, config, 1)?);
    let navigator = ObstacleNavigator::new(&config.control).context("Invalid control config")?;

    if approach {
        let approach = navigator.approach();
        let polls = approach.run(&mut vehicle).context("Approach failed")?;
        println!(
            "{} Stopped within {} cm after {} polls",
            "→".cyan(),
            approach.stop_distance_cm(),
            polls
        );
    }

    let survey = navigator.survey(&mut vehicle).context("Scan failed")?;

    print_scan(&survey.left_scan);
    print_scan(&survey.right_scan);
    println!(
        "{} left {}, right {} -> {}",
        "✓".green(),
        survey.left_clearance,
        survey.right_clearance,
        format_decision(survey.decision)
    );

    Ok(survey)
}

fn print_scan(scan: &ArcScan) {
    println!("{} {} arc", "→".cyan(), scan.side());
    for sample in scan.samples() {
        let reading = if sample.reading.is_sentinel() {
            sample.reading.to_string().yellow()
        } else {
            sample.reading.to_string().normal()
        };
        println!("  {:>4}°  {}", sample.angle, reading);
    }
}
