//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health - Status with session and uptime details

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub session: String,
    pub uptime_seconds: u64,
    pub version: String,
}

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, session) = match state.sessions.get().await {
        Ok(session) if session.is_authenticated() => ("healthy", "authenticated"),
        Ok(_) => ("healthy", "anonymous"),
        Err(e) => {
            tracing::warn!(error = %e, "Session store unreadable");
            ("degraded", "error")
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        session: session.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
