//! Auth section
//!
//! - POST /auth/login - exchange credentials for a session
//! - POST /auth/logout - clear the session and go home

use axum::{
    extract::State,
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::harness::error::{HarnessError, HarnessResult, Notice};
use crate::harness::layout::{escape, Toast};
use crate::harness::state::{AppState, Section};
use crate::session::Session;

use super::{render_home, render_notice, HomeView};

pub const AUTH_FAILED: &str = "Authentication failed. Please check your credentials.";

/// Query value the home page turns into the logout toast
pub(crate) const LOGGED_OUT_NOTICE: &str = "logged_out";

#[derive(Debug, Default)]
pub struct AuthPanel {
    pub username: String,
    pub succeeded: bool,
    pub error: Option<Notice>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /auth/login
///
/// On success the session is persisted before the page renders. On failure
/// the stored session is left as it was.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> HarnessResult<Html<String>> {
    let mut view = HomeView::default();
    view.auth.username = form.username.trim().to_string();

    let session = match authenticate(&state, &form).await {
        Ok(session) => {
            view.auth.succeeded = true;
            view.toast = Some(Toast::success("Login successful"));
            session
        }
        Err(err @ HarnessError::Session(_)) => return Err(err),
        Err(err) => {
            tracing::warn!(error = %err, "Login failed");
            view.auth.error = Some(view.fail(&err, AUTH_FAILED));
            state.sessions.get().await?
        }
    };

    Ok(Html(render_home(&session, &view)))
}

async fn authenticate(state: &AppState, form: &LoginForm) -> HarnessResult<Session> {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Err(HarnessError::Validation(
            "Please enter a username and password".into(),
        ));
    }

    let _guard = state.in_flight.begin(Section::Auth)?;
    let grant = state.client.login(username, &form.password).await?;
    let session = grant.into_session()?;
    state.sessions.set(session.clone()).await?;

    Ok(session)
}

/// POST /auth/logout
pub async fn logout(State(state): State<Arc<AppState>>) -> HarnessResult<Redirect> {
    state.sessions.clear().await?;
    tracing::info!("Logged out");
    Ok(Redirect::to(&format!("/?notice={}", LOGGED_OUT_NOTICE)))
}

pub(super) fn render(session: &Session, panel: &AuthPanel) -> String {
    let status = if panel.succeeded {
        r#"<p class="success">Authenticated successfully!</p>"#.to_string()
    } else if let Some(notice) = &panel.error {
        render_notice(notice)
    } else if session.is_authenticated() {
        format!(
            r#"<p class="muted">Signed in to account {}</p>"#,
            escape(session.account_id())
        )
    } else {
        String::new()
    };

    format!(
        r#"<section class="card" id="auth">
  <h2>Authentication</h2>
  <form method="post" action="/auth/login" data-busy>
    <div class="field">
      <label for="username">Username</label>
      <input id="username" name="username" type="text" autocomplete="username" value="{username}" required />
    </div>
    <div class="field">
      <label for="password">Password</label>
      <input id="password" name="password" type="password" autocomplete="current-password" required />
    </div>
    <button type="submit" class="btn" data-loading="Logging in...">Login</button>
  </form>
  {status}
</section>"#,
        username = escape(&panel.username),
        status = status,
    )
}
