//! Vehicle Command section
//!
//! POST /command - send a remote command to a device

use axum::{extract::State, response::Html, Form};
use serde::Deserialize;
use std::sync::Arc;

use crate::harness::error::{HarnessError, HarnessResult, Notice};
use crate::harness::layout::{escape, Toast};
use crate::harness::state::{AppState, Section};
use crate::session::Session;
use crate::voxx::Command;

use super::{render_home, render_notice, require_login, HomeView};

pub const SEND_FAILED: &str = "Failed to send command";

#[derive(Debug, Default)]
pub struct CommandPanel {
    pub command: Option<Command>,
    pub param: String,
    /// Pretty-printed API answer
    pub response: Option<String>,
    pub error: Option<Notice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommandForm {
    #[serde(rename = "deviceId", default)]
    pub device_id: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub param: String,
}

/// POST /command
pub async fn send_command(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CommandForm>,
) -> HarnessResult<Html<String>> {
    let session = state.sessions.get().await?;
    let mut view = HomeView::with_device(form.device_id.as_str());
    view.command.command = form.command.parse().ok();
    view.command.param = form.param.trim().to_string();

    match dispatch(&state, &session, &form).await {
        Ok((command, response)) => {
            view.toast = Some(Toast::success(format!(
                "Command {} sent successfully",
                command
            )));
            view.command.response = Some(response);
        }
        Err(err) => {
            tracing::warn!(device_id = %view.device_id, error = %err, "Command failed");
            view.command.error = Some(view.fail(&err, SEND_FAILED));
        }
    }

    Ok(Html(render_home(&session, &view)))
}

async fn dispatch(
    state: &AppState,
    session: &Session,
    form: &CommandForm,
) -> HarnessResult<(Command, String)> {
    require_login(session)?;

    let device_id = form.device_id.trim();
    if device_id.is_empty() {
        return Err(HarnessError::Validation("Please enter a device ID".into()));
    }
    let command: Command = form
        .command
        .parse()
        .map_err(|_| HarnessError::Validation("Please select a command".into()))?;
    let param = Some(form.param.trim()).filter(|p| !p.is_empty());

    let _guard = state.in_flight.begin(Section::Command)?;
    let response = state
        .client
        .send_command(device_id, command, param, session.token())
        .await?;

    let pretty = serde_json::to_string_pretty(&response)
        .map_err(|e| HarnessError::Internal(format!("Failed to encode response: {}", e)))?;
    Ok((command, pretty))
}

pub(super) fn render(device_id: &str, panel: &CommandPanel) -> String {
    let options: String = Command::ALL
        .iter()
        .map(|command| {
            let selected = if panel.command == Some(*command) {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{value}"{selected}>{value}</option>"#,
                value = command.as_str(),
                selected = selected
            )
        })
        .collect();

    let device_options = if device_id.is_empty() {
        r#"<option value="">Select a device</option>"#.to_string()
    } else {
        format!(
            r#"<option value="{id}" selected>{id}</option>"#,
            id = escape(device_id)
        )
    };

    let result = if let Some(notice) = &panel.error {
        render_notice(notice)
    } else if let Some(response) = &panel.response {
        format!(
            r#"<div class="field"><label>Response</label><pre>{}</pre></div>"#,
            escape(response)
        )
    } else {
        String::new()
    };

    format!(
        r#"<section class="card" id="command">
  <h2>Vehicle Command</h2>
  <form method="post" action="/command" data-busy>
    <div class="field">
      <label for="command-device">Device ID</label>
      <select id="command-device" name="deviceId">{device_options}</select>
    </div>
    <div class="field">
      <label for="command-name">Command</label>
      <select id="command-name" name="command">
        <option value="">Select a command</option>{options}
      </select>
    </div>
    <div class="field">
      <label for="command-param">Parameter (optional)</label>
      <input id="command-param" name="param" type="text" value="{param}" />
    </div>
    <button type="submit" class="btn" data-loading="Sending...">Send Command</button>
  </form>
  {result}
</section>"#,
        device_options = device_options,
        options = options,
        param = escape(&panel.param),
        result = result,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_every_command() {
        let html = render("dev-1", &CommandPanel::default());
        for command in Command::ALL {
            assert!(html.contains(&format!(r#"<option value="{}">"#, command.as_str())));
        }
        assert!(html.contains(r#"<option value="dev-1" selected>dev-1</option>"#));
    }

    #[test]
    fn test_render_keeps_selection_and_response() {
        let panel = CommandPanel {
            command: Some(Command::ReqFuel),
            param: "x".into(),
            response: Some("{\n  \"status\": \"queued\"\n}".into()),
            error: None,
        };
        let html = render("", &panel);

        assert!(html.contains(r#"<option value="req_fuel" selected>"#));
        assert!(html.contains("&quot;status&quot;: &quot;queued&quot;"));
        assert!(html.contains("Select a device"));
    }
}
