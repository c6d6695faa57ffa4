//! Display formatting for distances, times and identifiers

use chrono::{DateTime, TimeZone};
use thiserror::Error;

/// Decimal places used for mile distances unless the caller asks otherwise
pub const DEFAULT_DISTANCE_DECIMALS: usize = 2;

const FEET_PER_MILE: f64 = 5280.0;

/// Below this many miles a distance is shown in feet
const FEET_THRESHOLD_MILES: f64 = 0.01;

#[derive(Error, Debug, PartialEq)]
pub enum FormatError {
    #[error("Invalid distance value {0}. Must be a positive number.")]
    InvalidDistance(f64),
}

/// Format a distance given in miles.
///
/// Distances under 0.01 mi are shown as whole feet (`26 ft`), everything else
/// in miles with `decimals` places (`1.23 mi`).
pub fn format_distance(miles: f64, decimals: usize) -> Result<String, FormatError> {
    if !miles.is_finite() || miles < 0.0 {
        return Err(FormatError::InvalidDistance(miles));
    }

    if miles < FEET_THRESHOLD_MILES {
        let feet = miles * FEET_PER_MILE;
        return Ok(format!("{:.0} ft", feet));
    }

    Ok(format!("{:.*} mi", decimals, miles))
}

/// `Apr 1, 2024, 3:04:05 PM`
pub fn format_trip_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%b %-d, %Y, %-I:%M:%S %p").to_string()
}

/// `3:04:05 PM`
pub fn format_local_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%-I:%M:%S %p").to_string()
}

/// Speeds print without a trailing `.0` when they are whole numbers
pub fn format_speed(speed: f64) -> String {
    if speed.fract() == 0.0 && speed.abs() < 1e15 {
        format!("{}", speed as i64)
    } else {
        format!("{}", speed)
    }
}

/// First eight characters of a trip id followed by an ellipsis
pub fn short_trip_id(trip_id: &str) -> String {
    let prefix: String = trip_id.chars().take(8).collect();
    format!("{}...", prefix)
}
