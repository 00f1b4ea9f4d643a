//! Probe command - extract a turbulence profile from a cached forecast file.

use std::path::PathBuf;

use clap::Args;

use xweatherlayer::convert;
use xweatherlayer::wafs::{TurbulenceExtractor, WgribExtractor};

use crate::error::CliError;

/// Arguments for the probe command.
#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Forecast file to decode.
    pub file: PathBuf,

    /// Latitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Path to the wgrib2 decoder binary.
    #[arg(long, default_value = "wgrib2")]
    pub wgrib2: PathBuf,
}

/// Run the probe command.
pub fn run(args: ProbeArgs) -> Result<(), CliError> {
    if !args.file.exists() {
        return Err(CliError::InvalidArgument(format!(
            "forecast file {} does not exist",
            args.file.display()
        )));
    }

    // Joining against "." leaves both absolute and relative paths intact
    let extractor = WgribExtractor::new(args.wgrib2, PathBuf::from("."));
    let samples = extractor.extract(&args.file, args.lat, args.lon);

    if samples.is_empty() {
        println!("no turbulence data at {:.4}, {:.4}", args.lat, args.lon);
        return Ok(());
    }

    println!("turbulence profile at {:.4}, {:.4}:", args.lat, args.lon);
    for sample in samples {
        println!(
            "  {:>7.0} ft  {:.3}",
            convert::m_to_ft(sample.altitude_m),
            sample.intensity
        );
    }

    Ok(())
}
