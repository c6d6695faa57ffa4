//! Domain view-models
//!
//! Typed projections of Voxx API payloads. Built by the API client from the
//! wire schemas in `voxx::dto`; nothing here is cached between requests.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

/// Placeholder shown for device fields the API leaves out
pub const NOT_AVAILABLE: &str = "N/A";

/// A tracked vehicle/unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub device_id: String,
    pub air_id: String,
    pub model: String,
    pub name: String,
}

/// Endpoint address of a trip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub full_address: String,
    pub street: String,
}

/// A single recorded journey
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub trip_id: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub alerts: u32,
    /// Distance in miles
    pub distance: f64,
    pub start_address: Option<Address>,
    pub end_address: Option<Address>,
}

/// One GPS fix within a trip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Timestamp as sent by the API; parsed when the track is planned
    pub time_of_fix: String,
    /// Instantaneous speed in mph
    pub speed: f64,
}

impl TripPoint {
    pub fn new(latitude: f64, longitude: f64, time_of_fix: impl Into<String>, speed: f64) -> Self {
        Self {
            latitude,
            longitude,
            time_of_fix: time_of_fix.into(),
            speed,
        }
    }

    /// Parsed `time_of_fix`, if it is a recognizable timestamp
    pub fn fix_time(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.time_of_fix)
    }
}

/// Trip detail: the GPS fixes plus the untouched payload
#[derive(Debug, Clone, PartialEq)]
pub struct TripDetail {
    pub points: Vec<TripPoint>,
    pub raw: serde_json::Value,
}

/// Parse a timestamp the way the API sends them.
///
/// Accepts RFC 3339 (`2024-04-01T10:00:00Z`, offsets allowed), naive
/// ISO-8601 with optional fractional seconds (read as UTC), and integer
/// epoch milliseconds.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    value
        .parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}
