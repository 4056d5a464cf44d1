use crate::backend::{open_vehicle, Backend, StopOnDrop};
use crate::config::SlalomConfig;
use anyhow::{Context, Result};
use colored::*;
use slalom_library::Finale;

/// Perform only the closing dance
pub fn execute_finale(config: &SlalomConfig, backend: Backend) -> Result<()> {
    let mut vehicle = StopOnDrop::new(open_vehicle(backend, config, 0)?);
    let finale = Finale::new(config.control.drive.speed);

    println!(
        "{} Finale: {} moves over {:.2}s",
        "→".cyan(),
        finale.steps().len(),
        finale.duration().as_secs_f64()
    );
    finale.perform(&mut vehicle).context("Finale failed")?;
    println!("{} Done", "✓".green());
    Ok(())
}
