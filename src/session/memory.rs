//! In-memory session store

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Session, SessionError, SessionStore};

/// Session store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing session
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self) -> Result<Session, SessionError> {
        Ok(self.session.read().await.clone())
    }

    async fn set(&self, session: Session) -> Result<(), SessionError> {
        let value = if session.is_authenticated() {
            session
        } else {
            Session::anonymous()
        };
        *self.session.write().await = value;
        Ok(())
    }
}
