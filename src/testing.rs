//! Stub Voxx API for tests
//!
//! Serves canned responses on an ephemeral local port and counts every
//! request it receives.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const STUB_USERNAME: &str = "operator@fleet.io";
pub const STUB_PASSWORD: &str = "s3cret pw&1";
pub const STUB_TOKEN: &str = "tok-1";
pub const STUB_PARTNER_ID: &str = "4BHY0E1FBCJ5D5BF";
/// Login rejected with an empty body
pub const STUB_SILENT_USERNAME: &str = "silent@fleet.io";

#[derive(Clone, Default)]
struct StubState {
    hits: Arc<AtomicUsize>,
}

/// Running stub server
pub struct StubVoxx {
    base_url: String,
    hits: Arc<AtomicUsize>,
    handle: tokio::task::JoinHandle<()>,
}

impl StubVoxx {
    pub async fn start() -> Self {
        let state = StubState::default();
        let hits = Arc::clone(&state.hits);

        let router = Router::new()
            .route("/auth/login", post(login))
            .route("/devices/byaccount/:account_id", get(devices))
            .route("/devices/trips", get(trips))
            .route("/devices/tripDetails/:trip_id", get(trip_details))
            .route("/devices/command", post(command))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    /// Requests received so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for StubVoxx {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Token expired" })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", STUB_TOKEN))
        .unwrap_or(false)
}

async fn login(State(state): State<StubState>, headers: HeaderMap, body: String) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let partner_ok = headers
        .get("partnerId")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == STUB_PARTNER_ID)
        .unwrap_or(false);

    let expected = format!(
        "username={}&password={}",
        urlencoding::encode(STUB_USERNAME),
        urlencoding::encode(STUB_PASSWORD)
    );

    if body.starts_with(&format!("username={}&", urlencoding::encode(STUB_SILENT_USERNAME))) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    if partner_ok && body == expected {
        Json(json!({
            "results": {
                "authToken": { "accessToken": STUB_TOKEN },
                "user": { "accountId": "A1" }
            }
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn devices(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(account_id): Path<String>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }

    let devices = if account_id == "A1" {
        json!([
            { "id": "dev-100", "airId": "AIR-1", "model": "VX-9", "name": "Van 1" },
            { "id": 200, "airId": "AIR-2" }
        ])
    } else {
        json!([])
    };

    Json(json!({ "results": { "devices": devices } })).into_response()
}

async fn trips(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }

    match params.get("deviceIds").map(String::as_str) {
        Some("dev-100") => Json(json!({
            "results": {
                "tripList": [
                    {
                        "tripId": "trip-0001-aaaa-bbbb",
                        "startDate": "2024-04-01T10:00:00Z",
                        "endDate": "2024-04-01T10:30:00Z",
                        "alerts": 1,
                        "distance": 12.5,
                        "startAddress": { "fullAddress": "1 Main St, Springfield", "street": "1 Main St" },
                        "endAddress": { "fullAddress": "9 Elm Rd, Springfield", "street": "9 Elm Rd" }
                    },
                    {
                        "tripId": "trip-0002-cccc-dddd",
                        "startDate": "2024-04-02T08:00:00Z",
                        "endDate": "2024-04-02T08:05:00Z",
                        "distance": 0.004
                    }
                ]
            }
        }))
        .into_response(),
        _ => Json(json!({ "results": {} })).into_response(),
    }
}

async fn trip_details(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(trip_id): Path<String>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }

    if trip_id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Trip not found" })),
        )
            .into_response();
    }

    if trip_id == "pending" {
        return Json(json!({ "results": "pending", "status": "processing" })).into_response();
    }

    // Deliberately out of chronological order.
    Json(json!({
        "results": {
            "tripId": trip_id,
            "tripList": [
                { "latitude": 40.02, "longitude": -75.02, "timeOfFix": "2024-04-01T10:20:00Z", "speed": 35 },
                { "latitude": 40.00, "longitude": -75.00, "timeOfFix": "2024-04-01T10:00:00Z", "speed": 0 },
                { "latitude": 40.01, "longitude": -75.01, "timeOfFix": "2024-04-01T10:10:00Z", "speed": "28" }
            ]
        }
    }))
    .into_response()
}

async fn command(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }

    Json(json!({ "status": "queued", "results": body })).into_response()
}
