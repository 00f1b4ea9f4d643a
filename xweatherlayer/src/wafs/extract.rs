//! Turbulence extraction from cached forecast files.
//!
//! The binary forecast decoder is an external collaborator; this module
//! owns the seam. [`TurbulenceExtractor`] is the interface the rest of the
//! system sees, [`parse_turbulence_records`] understands the decoder's
//! textual inventory output, and [`WgribExtractor`] drives the external
//! `wgrib2` binary through it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::atmos;

/// Clear-air turbulence intensities are normalized by this divisor.
const INTENSITY_NORMALIZATION: f64 = 6.0;

/// Decoder variables that describe turbulence.
const TURBULENCE_VARIABLES: [&str; 2] = ["CAT", "CTP"];

/// One turbulence layer: intensity at an altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbulenceSample {
    /// Layer altitude in metres.
    pub altitude_m: f64,
    /// Normalized intensity.
    pub intensity: f64,
}

/// Produces a turbulence profile from a cached forecast file.
pub trait TurbulenceExtractor {
    /// Extract the profile at `(lat, lon)` from the cache-relative file.
    ///
    /// An unreadable or undecodable file yields an empty profile, never an
    /// error.
    fn extract(&self, cache_file: &Path, lat: f64, lon: f64) -> Vec<TurbulenceSample>;
}

/// Parse decoder inventory records into a turbulence profile.
///
/// Records are colon-delimited; field 4 names the variable, field 5 holds
/// `"<level> <unit>"`, field 7 the aggregation label, and field 8 ends in
/// `...=<value>`. Only pressure-level (`mb`) records aggregated as
/// `spatial max` for the turbulence variables are consumed. Negative values
/// clamp to zero, `CTP` is scaled ×100, and duplicate altitudes keep the
/// larger intensity. Malformed lines are skipped.
pub fn parse_turbulence_records<'a, I>(lines: I) -> Vec<TurbulenceSample>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut by_altitude: HashMap<i64, f64> = HashMap::new();

    for line in lines {
        let fields: Vec<&str> = line.trim_end().split(':').collect();
        if fields.len() < 8 {
            continue;
        }

        let variable = fields[3];
        if !TURBULENCE_VARIABLES.contains(&variable) {
            continue;
        }

        let mut level = fields[4].splitn(2, ' ');
        let (Some(level_value), Some(level_unit)) = (level.next(), level.next()) else {
            continue;
        };
        if level_unit != "mb" || fields[6] != "spatial max" {
            continue;
        }

        let Some(value_field) = fields[7].split(',').nth(2) else {
            continue;
        };
        let Some((_, raw_value)) = value_field.split_once('=') else {
            continue;
        };

        let (Ok(mb), Ok(parsed)) = (level_value.parse::<f64>(), raw_value.parse::<f64>()) else {
            tracing::debug!(line, "skipping unparsable inventory record");
            continue;
        };

        let mut value = parsed.max(0.0);
        if variable == "CTP" {
            value *= 100.0;
        }

        let altitude = atmos::pressure_to_altitude(mb) as i64;
        let entry = by_altitude.entry(altitude).or_insert(value);
        if value > *entry {
            *entry = value;
        }
    }

    let mut samples: Vec<TurbulenceSample> = by_altitude
        .into_iter()
        .map(|(altitude, value)| TurbulenceSample {
            altitude_m: altitude as f64,
            intensity: value / INTENSITY_NORMALIZATION,
        })
        .collect();
    samples.sort_by(|a, b| a.altitude_m.total_cmp(&b.altitude_m));
    samples
}

/// Extractor that shells out to an external `wgrib2` binary.
#[derive(Debug, Clone)]
pub struct WgribExtractor {
    binary: PathBuf,
    cache_root: PathBuf,
}

impl WgribExtractor {
    /// Create an extractor using `binary`, resolving cache-relative paths
    /// against `cache_root`.
    pub fn new(binary: PathBuf, cache_root: PathBuf) -> Self {
        Self { binary, cache_root }
    }
}

impl TurbulenceExtractor for WgribExtractor {
    fn extract(&self, cache_file: &Path, lat: f64, lon: f64) -> Vec<TurbulenceSample> {
        let path = self.cache_root.join(cache_file);

        let output = match Command::new(&self.binary)
            .arg("-s")
            .arg("-lon")
            .arg(format!("{lon}"))
            .arg(format!("{lat}"))
            .arg(&path)
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(
                    binary = %self.binary.display(),
                    error = %err,
                    "could not run forecast decoder"
                );
                return Vec::new();
            }
        };

        if !output.status.success() {
            tracing::warn!(
                file = %path.display(),
                status = %output.status,
                "forecast decoder failed"
            );
            return Vec::new();
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_turbulence_records(stdout.lines())
    }
}
