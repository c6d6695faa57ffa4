//! Harness Error Types
//!
//! Failures a section can run into, and the error page used for the ones no
//! section can render inline.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::session::{Session, SessionError};
use crate::track::RenderError;
use crate::voxx::VoxxError;

use super::layout::{escape, page};

/// Harness error types
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Missing input, unauthenticated session or overlapping request.
    /// Raised before any network call.
    #[error("{0}")]
    Validation(String),

    /// Login rejected, token missing or rejected by the API
    #[error("{0}")]
    Auth(String),

    /// Transport failure, non-2xx status or unexpected response body
    #[error("{0}")]
    Request(String),

    /// Track could not be rendered
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Session store could not be read or written
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<VoxxError> for HarnessError {
    fn from(err: VoxxError) -> Self {
        match &err {
            VoxxError::Status { status, .. } if *status == 401 || *status == 403 => {
                HarnessError::Auth(err.to_string())
            }
            _ if err.is_auth() => HarnessError::Auth(err.to_string()),
            _ => HarnessError::Request(err.to_string()),
        }
    }
}

/// Error response body for the JSON endpoints
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// A [`HarnessError`] answered as [`ErrorResponse`] JSON instead of an HTML page
#[derive(Debug)]
pub struct JsonError(pub HarnessError);

impl From<HarnessError> for JsonError {
    fn from(err: HarnessError) -> Self {
        JsonError(err)
    }
}

/// Inline error text for a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub detail: Option<String>,
}

impl HarnessError {
    /// Text shown inside the section that failed. Validation messages are
    /// shown as-is; remote failures show `fallback` with the cause underneath.
    pub fn notice(&self, fallback: &str) -> Notice {
        match self {
            HarnessError::Validation(message) => Notice {
                message: message.clone(),
                detail: None,
            },
            other => Notice {
                message: fallback.to_string(),
                detail: Some(other.to_string()),
            },
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            HarnessError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            HarnessError::Auth(_) => (StatusCode::UNAUTHORIZED, "AUTH_ERROR"),
            HarnessError::Request(_) => (StatusCode::BAD_GATEWAY, "REQUEST_ERROR"),
            HarnessError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_ERROR"),
            HarnessError::Session(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SESSION_ERROR"),
            HarnessError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Log the failure under a fresh request id
    fn report(&self) -> (StatusCode, &'static str, String) {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "Harness error occurred"
        );

        (status, code, request_id)
    }
}

impl IntoResponse for HarnessError {
    fn into_response(self) -> Response {
        let (status, code, request_id) = self.report();

        let body = format!(
            r#"<div class="card">
  <h2>Something went wrong</h2>
  <p class="error">{message}</p>
  <p class="muted">{code} &middot; request {request_id}</p>
  <a href="/" class="btn btn-outline btn-sm">Back</a>
</div>"#,
            message = escape(&self.to_string()),
            code = code,
            request_id = request_id,
        );

        let html = page("Error", &Session::anonymous(), &body, None);
        (status, Html(html)).into_response()
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let (status, code, request_id) = self.0.report();

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.0.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;
