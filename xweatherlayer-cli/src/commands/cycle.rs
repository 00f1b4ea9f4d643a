//! Cycle command - show the currently authoritative forecast cycle.

use chrono::{DateTime, Utc};
use clap::Args;

use xweatherlayer::wafs::{self, WafsConfig};

use crate::error::CliError;

/// Arguments for the cycle command.
#[derive(Debug, Args)]
pub struct CycleArgs {
    /// Evaluate at this RFC 3339 instant instead of now.
    #[arg(long)]
    pub at: Option<String>,
}

/// Run the cycle command.
pub fn run(args: CycleArgs) -> Result<(), CliError> {
    let now = match args.at {
        Some(ref raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| CliError::InvalidArgument(format!("cannot parse '{}': {}", raw, e)))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let cycle = xweatherlayer::current_cycle(now);
    let base_url = WafsConfig::default().base_url;

    println!("datecycle:     {}", cycle.datecycle);
    println!("cycle hour:    {:02}Z", cycle.cycle_hour);
    println!("forecast hour: f{:02}", cycle.forecast_hour);
    println!("url:           {}", wafs::forecast_url(&base_url, &cycle));

    Ok(())
}
