//! Trip List section
//!
//! GET /trips?deviceId= - trips recorded for one device

use axum::{
    extract::{Query, State},
    response::Html,
};
use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::format::{format_distance, format_trip_time, short_trip_id, DEFAULT_DISTANCE_DECIMALS};
use crate::harness::error::{HarnessError, HarnessResult, Notice};
use crate::harness::layout::escape;
use crate::harness::state::{AppState, Section};
use crate::model::{Address, Trip, NOT_AVAILABLE};
use crate::session::Session;

use super::{render_home, render_notice, require_login, HomeView};

pub const FETCH_FAILED: &str = "Failed to fetch trips";

/// Date range shown in the form. The API call does not filter by it.
pub const DEFAULT_FROM: &str = "2024-04-01";
pub const DEFAULT_TO: &str = "2024-04-10";

#[derive(Debug)]
pub struct TripsPanel {
    pub from: String,
    pub to: String,
    pub trips: Option<Vec<Trip>>,
    pub error: Option<Notice>,
}

impl Default for TripsPanel {
    fn default() -> Self {
        Self {
            from: DEFAULT_FROM.to_string(),
            to: DEFAULT_TO.to_string(),
            trips: None,
            error: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TripsQuery {
    #[serde(rename = "deviceId", default)]
    pub device_id: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

/// GET /trips
pub async fn fetch_trips(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TripsQuery>,
) -> HarnessResult<Html<String>> {
    let session = state.sessions.get().await?;
    let mut view = HomeView::with_device(query.device_id);
    if let Some(from) = query.from.filter(|v| !v.is_empty()) {
        view.trips.from = from;
    }
    if let Some(to) = query.to.filter(|v| !v.is_empty()) {
        view.trips.to = to;
    }

    match lookup(&state, &session, &view.device_id).await {
        Ok(trips) => view.trips.trips = Some(trips),
        Err(err) => {
            tracing::warn!(device_id = %view.device_id, error = %err, "Trip lookup failed");
            view.trips.error = Some(view.fail(&err, FETCH_FAILED));
        }
    }

    Ok(Html(render_home(&session, &view)))
}

async fn lookup(state: &AppState, session: &Session, device_id: &str) -> HarnessResult<Vec<Trip>> {
    require_login(session)?;
    if device_id.is_empty() {
        return Err(HarnessError::Validation("Please enter device IDs".into()));
    }
    let _guard = state.in_flight.begin(Section::Trips)?;

    let trips = state.client.list_trips(device_id, session.token()).await?;
    Ok(trips)
}

pub(super) fn render(device_id: &str, panel: &TripsPanel) -> String {
    let result = if let Some(notice) = &panel.error {
        render_notice(notice)
    } else {
        match &panel.trips {
            Some(trips) if trips.is_empty() => r#"<p class="muted">No trips found</p>"#.to_string(),
            Some(trips) => render_table(trips),
            None => String::new(),
        }
    };

    format!(
        r#"<section class="card" id="trips">
  <h2>Trips</h2>
  <form method="get" action="/trips" data-busy>
    <div class="field">
      <label for="trip-device">Device IDs</label>
      <input id="trip-device" name="deviceId" type="text" value="{device_id}" />
    </div>
    <div class="row">
      <div class="field">
        <label for="trip-from">From</label>
        <input id="trip-from" name="from" type="date" value="{from}" />
      </div>
      <div class="field">
        <label for="trip-to">To</label>
        <input id="trip-to" name="to" type="date" value="{to}" />
      </div>
    </div>
    <button type="submit" class="btn" data-loading="Fetching...">Fetch Trips</button>
  </form>
  {result}
</section>"#,
        device_id = escape(device_id),
        from = escape(&panel.from),
        to = escape(&panel.to),
        result = result,
    )
}

fn render_table(trips: &[Trip]) -> String {
    let rows: String = trips.iter().map(render_row).collect();
    format!(
        r#"<div class="scroll"><table>
  <thead><tr><th>TripId</th><th>Start - End</th><th>Started From</th><th>Ended At</th><th>Miles</th></tr></thead>
  <tbody>{}</tbody>
</table></div>"#,
        rows
    )
}

fn render_row(trip: &Trip) -> String {
    let time = |t: Option<DateTime<Utc>>| {
        t.map(|t| format_trip_time(&t.with_timezone(&Local)))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };
    let miles = format_distance(trip.distance, DEFAULT_DISTANCE_DECIMALS)
        .unwrap_or_else(|_| NOT_AVAILABLE.to_string());

    format!(
        r#"<tr><td><a href="/details/{link}" target="_blank" rel="noopener" title="{id}">{short}</a></td><td>{start} - {end}</td>{from}{to}<td>{miles}</td></tr>"#,
        link = urlencoding::encode(&trip.trip_id),
        id = escape(&trip.trip_id),
        short = escape(&short_trip_id(&trip.trip_id)),
        start = time(trip.start),
        end = time(trip.end),
        from = address_cell(trip.start_address.as_ref()),
        to = address_cell(trip.end_address.as_ref()),
        miles = miles,
    )
}

fn address_cell(address: Option<&Address>) -> String {
    match address {
        Some(address) => format!(
            r#"<td title="{}">{}</td>"#,
            escape(&address.full_address),
            escape(&address.street)
        ),
        None => format!("<td>{}</td>", NOT_AVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(id: &str, distance: f64) -> Trip {
        Trip {
            trip_id: id.into(),
            start: None,
            end: None,
            alerts: 0,
            distance,
            start_address: Some(Address {
                full_address: "1 Main St, Springfield".into(),
                street: "1 Main St".into(),
            }),
            end_address: None,
        }
    }

    #[test]
    fn test_row_shortens_id_and_formats_distance() {
        let html = render_row(&trip("trip-0001-aaaa-bbbb", 12.5));

        assert!(html.contains(r#"href="/details/trip-0001-aaaa-bbbb""#));
        assert!(html.contains(">trip-000...</a>"));
        assert!(html.contains("<td>12.50 mi</td>"));
        assert!(html.contains(r#"<td title="1 Main St, Springfield">1 Main St</td>"#));
        assert!(html.contains("<td>N/A - N/A</td>"));
    }

    #[test]
    fn test_short_distance_in_feet() {
        assert!(render_row(&trip("t", 0.005)).contains("<td>26 ft</td>"));
    }

    #[test]
    fn test_default_dates() {
        let html = render("", &TripsPanel::default());
        assert!(html.contains(r#"value="2024-04-01""#));
        assert!(html.contains(r#"value="2024-04-10""#));
    }

    #[test]
    fn test_empty_list() {
        let panel = TripsPanel {
            trips: Some(Vec::new()),
            ..TripsPanel::default()
        };
        assert!(render("dev-1", &panel).contains("No trips found"));
    }
}
