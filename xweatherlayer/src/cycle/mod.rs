//! Forecast cycle scheduling.
//!
//! The upper-air forecast is published in cycles at fixed hours of the day,
//! each cycle carrying files at a handful of hours-ahead horizons. Given a
//! wall-clock instant, [`current_cycle`] answers: which cycle is available
//! for download right now, and which forecast hour inside it covers the
//! present?

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

/// Hours of day at which forecast cycles are published.
pub const CYCLE_HOURS: [u8; 4] = [0, 6, 12, 18];

/// Forecast horizons (hours ahead) available within each cycle.
pub const FORECAST_HOURS: [u8; 7] = [6, 9, 12, 15, 18, 21, 24];

/// Delay between a cycle's nominal hour and its availability for download.
pub const PUBLICATION_DELAY_HOURS: i64 = 5;

/// Identifies one forecast file: a cycle plus a horizon within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDescriptor {
    /// Cycle identifier, `YYYYMMDDHH`.
    pub datecycle: String,
    /// Publication hour of day, one of [`CYCLE_HOURS`].
    pub cycle_hour: u8,
    /// Hours-ahead horizon, one of [`FORECAST_HOURS`].
    pub forecast_hour: u8,
}

/// Returns the cycle and forecast hour that are authoritative at `now`.
///
/// The publication delay is subtracted first, so a cycle is only selected
/// once its files can actually exist on the server. The forecast hour is the
/// smallest horizon covering the hours elapsed since the cycle ran, clamped
/// to the largest tabulated horizon.
///
/// Pure and idempotent: equal instants yield equal descriptors.
pub fn current_cycle(now: DateTime<Utc>) -> CycleDescriptor {
    let adjusted = now - Duration::hours(PUBLICATION_DELAY_HOURS);

    let mut cycle_hour = CYCLE_HOURS[0];
    for &candidate in &CYCLE_HOURS {
        if adjusted.hour() >= u32::from(candidate) {
            cycle_hour = candidate;
        }
    }

    // The delay can pull `adjusted` into the previous day; elapsed time is
    // still measured against the real clock.
    let rollover = if adjusted.day() != now.day() { 24 } else { 0 };
    let elapsed_hours = rollover + i64::from(now.hour()) - i64::from(cycle_hour);

    let mut forecast_hour = FORECAST_HOURS[FORECAST_HOURS.len() - 1];
    for &candidate in &FORECAST_HOURS {
        if elapsed_hours <= i64::from(candidate) {
            forecast_hour = candidate;
            break;
        }
    }

    CycleDescriptor {
        datecycle: format!(
            "{:04}{:02}{:02}{:02}",
            adjusted.year(),
            adjusted.month(),
            adjusted.day(),
            cycle_hour
        ),
        cycle_hour,
        forecast_hour,
    }
}
