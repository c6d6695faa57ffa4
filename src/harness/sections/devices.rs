//! Device Lookup section
//!
//! GET /devices - list the devices of the logged-in account

use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::harness::error::{HarnessResult, Notice};
use crate::harness::layout::{escape, Toast};
use crate::harness::state::{AppState, Section};
use crate::model::Device;
use crate::session::Session;

use super::{render_home, render_notice, require_login, HomeView};

pub const FETCH_FAILED: &str = "Failed to fetch devices";

#[derive(Debug, Default)]
pub struct DevicesPanel {
    /// `None` until a lookup has run
    pub devices: Option<Vec<Device>>,
    pub error: Option<Notice>,
}

/// GET /devices
///
/// Starts from a fresh view: any previously selected device is cleared.
pub async fn fetch_devices(State(state): State<Arc<AppState>>) -> HarnessResult<Html<String>> {
    let session = state.sessions.get().await?;
    let mut view = HomeView::default();

    match lookup(&state, &session).await {
        Ok(devices) => {
            view.toast = Some(Toast::success(format!("Found {} devices", devices.len())));
            view.devices.devices = Some(devices);
        }
        Err(err) => {
            tracing::warn!(error = %err, "Device lookup failed");
            view.devices.error = Some(view.fail(&err, FETCH_FAILED));
        }
    }

    Ok(Html(render_home(&session, &view)))
}

async fn lookup(state: &AppState, session: &Session) -> HarnessResult<Vec<Device>> {
    require_login(session)?;
    let _guard = state.in_flight.begin(Section::Devices)?;

    let devices = state
        .client
        .list_devices_by_account(session.account_id(), session.token())
        .await?;
    Ok(devices)
}

pub(super) fn render(panel: &DevicesPanel) -> String {
    let result = if let Some(notice) = &panel.error {
        render_notice(notice)
    } else {
        match &panel.devices {
            Some(devices) if devices.is_empty() => {
                r#"<p class="muted">No devices found</p>"#.to_string()
            }
            Some(devices) => render_table(devices),
            None => String::new(),
        }
    };

    format!(
        r#"<section class="card" id="devices">
  <h2>Device Lookup</h2>
  <div class="tabs"><span class="active">By Account</span><span title="Not available">By Air ID</span></div>
  <form method="get" action="/devices" data-busy>
    <button type="submit" class="btn" data-loading="Fetching...">Fetch Devices</button>
  </form>
  {result}
</section>"#,
        result = result,
    )
}

fn render_table(devices: &[Device]) -> String {
    let rows: String = devices
        .iter()
        .map(|device| {
            format!(
                r#"<tr><td><a href="/?deviceId={link}">{id}</a></td><td>{air_id}</td><td>{name}</td></tr>"#,
                link = urlencoding::encode(&device.device_id),
                id = escape(&device.device_id),
                air_id = escape(&device.air_id),
                name = escape(&device.name),
            )
        })
        .collect();

    format!(
        r#"<div class="scroll"><table>
  <thead><tr><th>DeviceId</th><th>Airid</th><th>Name</th></tr></thead>
  <tbody>{}</tbody>
</table></div>"#,
        rows
    )
}
