//! View Sections
//!
//! One module per form on the harness page. Every section follows the same
//! flow: validate locally, take the section's in-flight guard, call the Voxx
//! client, then render the result or an inline error.
//!
//! - `auth` - login and logout
//! - `devices` - device lookup by account
//! - `trips` - trip list for a device
//! - `command` - remote vehicle command
//! - `trip_detail` - raw trip payload and route map on its own page

pub mod auth;
pub mod command;
pub mod devices;
pub mod trip_detail;
pub mod trips;

use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::session::Session;

use super::error::{HarnessError, HarnessResult, Notice};
use super::layout::{escape, page, Toast, APP_TITLE};
use super::state::AppState;

/// Everything shown on the home page for one response
#[derive(Debug, Default)]
pub struct HomeView {
    /// Device selected via the shared `deviceId` query parameter
    pub device_id: String,
    pub auth: auth::AuthPanel,
    pub devices: devices::DevicesPanel,
    pub trips: trips::TripsPanel,
    pub command: command::CommandPanel,
    pub toast: Option<Toast>,
}

impl HomeView {
    pub fn with_device(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into().trim().to_string(),
            ..Self::default()
        }
    }

    /// Record a section failure: inline notice plus an error toast
    fn fail(&mut self, err: &HarnessError, fallback: &str) -> Notice {
        let notice = err.notice(fallback);
        self.toast = Some(Toast::error(notice.message.clone()));
        notice
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    #[serde(rename = "deviceId", default)]
    pub device_id: String,
    #[serde(default)]
    pub notice: Option<String>,
}

/// GET /
pub async fn home(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HomeQuery>,
) -> HarnessResult<Html<String>> {
    let session = state.sessions.get().await?;
    let mut view = HomeView::with_device(query.device_id);

    if query.notice.as_deref() == Some(auth::LOGGED_OUT_NOTICE) {
        view.toast = Some(Toast::warning("Logged out successfully"));
    }

    Ok(Html(render_home(&session, &view)))
}

/// Reject the action locally when nobody is logged in
pub(crate) fn require_login(session: &Session) -> HarnessResult<()> {
    if session.is_authenticated() {
        Ok(())
    } else {
        Err(HarnessError::Validation("Please login first".into()))
    }
}

pub fn render_home(session: &Session, view: &HomeView) -> String {
    let body = format!(
        r#"<div class="grid">
{auth}
{devices}
{trips}
{command}
</div>"#,
        auth = auth::render(session, &view.auth),
        devices = devices::render(&view.devices),
        trips = trips::render(&view.device_id, &view.trips),
        command = command::render(&view.device_id, &view.command),
    );

    page(APP_TITLE, session, &body, view.toast.as_ref())
}

fn render_notice(notice: &Notice) -> String {
    match &notice.detail {
        Some(detail) => format!(
            r#"<p class="error">{}</p><p class="muted">{}</p>"#,
            escape(&notice.message),
            escape(detail)
        ),
        None => format!(r#"<p class="error">{}</p>"#, escape(&notice.message)),
    }
}
