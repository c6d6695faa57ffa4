//! Trip Detail page
//!
//! - GET /details/:id - raw payload and route map
//! - GET /details/:id/track.geojson - the sorted track as GeoJSON

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::format::short_trip_id;
use crate::harness::error::{HarnessError, HarnessResult, JsonError};
use crate::harness::layout::{escape, page};
use crate::harness::state::AppState;
use crate::model::TripDetail;
use crate::session::Session;
use crate::track::{render_map, track_geojson, TrackPlan};
use crate::voxx::VoxxError;

/// GET /details/:id
pub async fn trip_detail(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
) -> HarnessResult<Html<String>> {
    let session = state.sessions.get().await?;

    let result = match load(&state, &session, &trip_id).await {
        Ok(detail) => render_detail(&detail)?,
        Err(err) => {
            tracing::warn!(trip_id = %trip_id, error = %err, "Trip detail failed");
            format!(r#"<p class="error">Error: {}</p>"#, escape(&err.to_string()))
        }
    };

    let body = format!(
        r#"<section class="detail">
  <h2>API : /v1/devices/tripDetails/{trip_id}</h2>
  {result}
</section>"#,
        trip_id = escape(&trip_id),
        result = result,
    );

    let title = format!("Trip {}", short_trip_id(&trip_id));
    Ok(Html(page(&title, &session, &body, None)))
}

/// GET /details/:id/track.geojson
pub async fn trip_track(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
) -> Result<Json<Value>, JsonError> {
    Ok(Json(track(&state, &trip_id).await?))
}

async fn track(state: &AppState, trip_id: &str) -> HarnessResult<Value> {
    let session = state.sessions.get().await?;
    let detail = load(state, &session, trip_id).await?;
    let plan = TrackPlan::from_points(&detail.points);
    Ok(track_geojson(&plan))
}

async fn load(state: &AppState, session: &Session, trip_id: &str) -> HarnessResult<TripDetail> {
    if session.token().is_empty() {
        return Err(HarnessError::Auth("Authorization token is missing".into()));
    }

    state
        .client
        .get_trip_detail(trip_id, session.token())
        .await
        .map_err(detail_error)
}

/// The API's own message for a rejected request, e.g. "Trip not found"
fn detail_error(err: VoxxError) -> HarnessError {
    match err {
        VoxxError::Status { status, message } if !message.is_empty() => {
            if status == 401 || status == 403 {
                HarnessError::Auth(message)
            } else {
                HarnessError::Request(message)
            }
        }
        other => other.into(),
    }
}

fn render_detail(detail: &TripDetail) -> HarnessResult<String> {
    let raw = serde_json::to_string_pretty(&detail.raw)
        .map_err(|e| HarnessError::Internal(format!("Failed to encode trip detail: {}", e)))?;

    let plan = TrackPlan::from_points(&detail.points);
    let map = if plan.is_empty() {
        r#"<p class="muted">No GPS points to display</p>"#.to_string()
    } else {
        render_map(&plan)?
    };
    let skipped = match plan.skipped {
        0 => String::new(),
        n => format!(
            r#"<p class="muted">{} point(s) without a usable position or time were skipped</p>"#,
            n
        ),
    };

    Ok(format!(
        r#"<div class="split">
  <pre>{raw}</pre>
  <div>{skipped}{map}</div>
</div>"#,
        raw = escape(&raw),
        skipped = skipped,
        map = map,
    ))
}
