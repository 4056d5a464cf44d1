use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use slalom_manager::commands;
use slalom_manager::commands::run::RunOptions;
use slalom_manager::{Backend, SlalomConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "slalom")]
#[command(about = "Drive a ranging-sensor car through an obstacle course")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (defaults to ./slalom.toml when present)
    #[arg(short = 'c', long = "config", global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Vehicle to drive
    #[arg(short = 'b', long = "backend", global = true, value_enum, default_value_t = Backend::Sim)]
    backend: Backend,

    /// More log output (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full obstacle course
    Run {
        /// Number of obstacles (overrides course.obstacles)
        #[arg(short = 'n', long = "obstacles")]
        obstacles: Option<u32>,

        /// Skip the closing dance
        #[arg(long = "no-finale")]
        no_finale: bool,

        /// Start immediately
        #[arg(long = "no-delay")]
        no_delay: bool,
    },

    /// Sweep both side arcs and print the readings without turning
    Scan {
        /// Drive up to the obstacle before scanning
        #[arg(short = 'a', long = "approach")]
        approach: bool,
    },

    /// Perform only the closing dance
    Finale,

    /// Print the configuration as TOML
    Config {
        /// Print built-in defaults instead of the loaded file
        #[arg(short = 'd', long = "defaults")]
        defaults: bool,

        /// Write to a file instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let default_filter = format!(
        "slalom={level},slalom_manager={level},slalom_library={level},slalom_core={level}"
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run_command(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_command(cli: Cli) -> Result<()> {
    let config = SlalomConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            obstacles,
            no_finale,
            no_delay,
        } => {
            slalom_manager::backend::install_stop_handler(cli.backend, &config)?;
            let options = RunOptions {
                obstacles,
                skip_finale: no_finale,
                no_delay,
            };
            commands::run::execute_run(&config, cli.backend, &options).map(|_| ())
        }

        Commands::Scan { approach } => {
            slalom_manager::backend::install_stop_handler(cli.backend, &config)?;
            commands::scan::execute_scan(&config, cli.backend, approach).map(|_| ())
        }

        Commands::Finale => {
            slalom_manager::backend::install_stop_handler(cli.backend, &config)?;
            commands::finale::execute_finale(&config, cli.backend)
        }

        Commands::Config { defaults, output } => {
            commands::config::execute_config(&config, defaults, output.as_deref())
        }
    }
}
