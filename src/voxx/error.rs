//! Voxx client error types

use thiserror::Error;

/// Errors returned by [`super::VoxxClient`]
#[derive(Error, Debug)]
pub enum VoxxError {
    /// Login rejected or could not reach the auth endpoint
    #[error("{0}")]
    Auth(String),

    /// A data endpoint was called without a bearer token
    #[error("Authorization token is missing")]
    MissingToken,

    /// Non-2xx response from a data endpoint
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, TLS or body read failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response that does not match the expected schema
    #[error("Unexpected response: {0}")]
    Schema(String),
}

impl VoxxError {
    /// True when the failure is an authentication problem
    pub fn is_auth(&self) -> bool {
        matches!(self, VoxxError::Auth(_) | VoxxError::MissingToken)
    }
}

/// Result type for Voxx client operations
pub type VoxxResult<T> = Result<T, VoxxError>;
