//! XWeatherLayer CLI - Command-line interface
//!
//! This binary provides a command-line interface to the XWeatherLayer
//! library: inspecting the authoritative forecast cycle, probing cached
//! forecast files, and running the background download coordinator.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use error::CliError;

#[derive(Parser)]
#[command(
    name = "xweatherlayer",
    about = "Smooth NOAA WAFS weather for X-Plane",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the currently authoritative forecast cycle.
    Cycle(commands::cycle::CycleArgs),
    /// Extract a turbulence profile from a cached forecast file.
    Probe(commands::probe::ProbeArgs),
    /// Run the download coordinator until interrupted.
    Watch(commands::watch::WatchArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result: Result<(), CliError> = match cli.command {
        Command::Cycle(args) => commands::cycle::run(args),
        Command::Probe(args) => commands::probe::run(args),
        Command::Watch(args) => commands::watch::run(args),
    };

    if let Err(err) = result {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
