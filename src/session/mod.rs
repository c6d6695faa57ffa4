//! Session Store
//!
//! Holds the bearer token and account id obtained at login.
//!
//! ## Architecture
//!
//! - **Session**: the value; authenticated iff both parts are non-empty
//! - **SessionStore**: read/update/clear contract injected into consumers
//! - **FileSessionStore**: persists the two values to a local JSON file
//! - **MemorySessionStore**: process-local store for tests and ephemeral runs

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::SessionConfig;

/// Authentication state shared by every section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: String,
    account_id: String,
}

impl Session {
    /// An unauthenticated session
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build an authenticated session. Both parts must be non-empty.
    pub fn authenticated(
        token: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let token = token.into();
        let account_id = account_id.into();

        if token.trim().is_empty() {
            return Err(SessionError::Invalid("token is empty".into()));
        }
        if account_id.trim().is_empty() {
            return Err(SessionError::Invalid("account id is empty".into()));
        }

        Ok(Self { token, account_id })
    }

    /// True when both the token and the account id are present
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty() && !self.account_id.is_empty()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

/// Read/update/clear access to the persisted session
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current session; anonymous when nothing is stored
    async fn get(&self) -> Result<Session, SessionError>;

    /// Persist an authenticated session, or remove the stored values otherwise
    async fn set(&self, session: Session) -> Result<(), SessionError>;

    /// Remove both stored values
    async fn clear(&self) -> Result<(), SessionError> {
        self.set(Session::anonymous()).await
    }
}

/// Store for a process: the configured session file, or memory only when
/// `ephemeral` is set
pub fn open_store(config: &SessionConfig, ephemeral: bool) -> Arc<dyn SessionStore> {
    if ephemeral {
        tracing::info!("Using an in-memory session; nothing is written to disk");
        Arc::new(MemorySessionStore::new())
    } else {
        tracing::info!("Session file: {:?}", config.path);
        Arc::new(FileSessionStore::new(&config.path))
    }
}

/// Errors that can occur while reading or writing the session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid session: {0}")]
    Invalid(String),
}
