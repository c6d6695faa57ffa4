//! Wire schemas for Voxx API payloads
//!
//! Every response is parsed into one of these types at the client boundary and
//! converted into the view-models in [`crate::model`]. Fields the API is loose
//! about (ids sent as numbers, speeds sent as strings) are read leniently.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Command;
use crate::model::{parse_timestamp, Address, Device, Trip, TripPoint, NOT_AVAILABLE};

// ============================================
// Lenient field readers
// ============================================

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

// ============================================
// Login
// ============================================

#[derive(Debug, Deserialize)]
pub(crate) struct LoginEnvelope {
    pub results: Option<LoginResults>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResults {
    pub auth_token: Option<AuthToken>,
    pub user: Option<LoginUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthToken {
    #[serde(default, deserialize_with = "lenient_string")]
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginUser {
    #[serde(default, deserialize_with = "lenient_string")]
    pub account_id: Option<String>,
}

impl LoginEnvelope {
    /// Extract `(accessToken, accountId)`, both required and non-empty
    pub fn into_parts(self) -> Result<(String, String), String> {
        let results = self.results.ok_or("missing results")?;

        let token = non_empty(results.auth_token.and_then(|t| t.access_token))
            .ok_or("missing results.authToken.accessToken")?;
        let account_id = non_empty(results.user.and_then(|u| u.account_id))
            .ok_or("missing results.user.accountId")?;

        Ok((token, account_id))
    }
}

// ============================================
// Devices
// ============================================

#[derive(Debug, Deserialize)]
pub(crate) struct DevicesEnvelope {
    pub results: Option<DevicesResults>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DevicesResults {
    #[serde(default)]
    pub devices: Vec<DeviceDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeviceDto {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub air_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

impl From<DeviceDto> for Device {
    fn from(dto: DeviceDto) -> Self {
        let or_na = |value: Option<String>| non_empty(value).unwrap_or_else(|| NOT_AVAILABLE.into());
        Device {
            device_id: dto.id.unwrap_or_default(),
            air_id: or_na(dto.air_id),
            model: or_na(dto.model),
            name: or_na(dto.name),
        }
    }
}

// ============================================
// Trips
// ============================================

#[derive(Debug, Deserialize)]
pub(crate) struct TripsEnvelope {
    pub results: Option<TripsResults>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TripsResults {
    #[serde(default)]
    pub trip_list: Option<Vec<TripDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TripDto {
    #[serde(default, deserialize_with = "lenient_string")]
    pub trip_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub alerts: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub distance: Option<f64>,
    #[serde(default)]
    pub start_address: Option<AddressDto>,
    #[serde(default)]
    pub end_address: Option<AddressDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddressDto {
    #[serde(default)]
    pub full_address: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
}

impl From<AddressDto> for Address {
    fn from(dto: AddressDto) -> Self {
        Address {
            full_address: dto.full_address.unwrap_or_default(),
            street: dto.street.unwrap_or_default(),
        }
    }
}

impl From<TripDto> for Trip {
    fn from(dto: TripDto) -> Self {
        Trip {
            trip_id: dto.trip_id.unwrap_or_default(),
            start: dto.start_date.as_deref().and_then(parse_timestamp),
            end: dto.end_date.as_deref().and_then(parse_timestamp),
            alerts: dto
                .alerts
                .filter(|a| a.is_finite() && *a > 0.0)
                .map(|a| a as u32)
                .unwrap_or(0),
            distance: dto.distance.filter(|d| d.is_finite()).unwrap_or(0.0),
            start_address: dto.start_address.map(Address::from),
            end_address: dto.end_address.map(Address::from),
        }
    }
}

// ============================================
// Trip details
// ============================================

/// Points under `results.tripList`
///
/// A missing or null list means no points. Entries that are not objects become
/// unusable fixes so the planner counts them as skipped. Any other shape is
/// reported as an error for the caller to log.
pub(crate) fn trip_points(raw: &Value) -> Result<Vec<TripPoint>, String> {
    let results = match raw.get("results") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(results) if results.is_object() => results,
        Some(other) => return Err(format!("results is not an object: {}", other)),
    };

    match results.get("tripList") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .map(|item| {
                TripPointDto::deserialize(item)
                    .map(TripPoint::from)
                    .unwrap_or_else(|_| TripPoint::from(TripPointDto::default()))
            })
            .collect()),
        Some(other) => Err(format!("tripList is not an array: {}", other)),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TripPointDto {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time_of_fix: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub speed: Option<f64>,
}

impl From<TripPointDto> for TripPoint {
    fn from(dto: TripPointDto) -> Self {
        // Missing coordinates become NaN so the track planner drops the fix.
        TripPoint {
            latitude: dto.latitude.unwrap_or(f64::NAN),
            longitude: dto.longitude.unwrap_or(f64::NAN),
            time_of_fix: dto.time_of_fix.unwrap_or_default(),
            speed: dto.speed.unwrap_or(0.0),
        }
    }
}

// ============================================
// Commands and errors
// ============================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommandRequest<'a> {
    pub device_id: &'a str,
    pub command: Command,
    pub param: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

/// Pick the most useful message out of an error response body
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}
