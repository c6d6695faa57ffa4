//! File-backed session store
//!
//! Persists the token and account id as a two-key JSON object:
//!
//! ```json
//! { "voxx_token": "...", "voxx_account_id": "..." }
//! ```
//!
//! Both keys are written together and removed together. Writes go through a
//! sibling temp file and a rename, so a reader never sees only one key.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{Session, SessionError, SessionStore};

/// Persisted shape of the session
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    voxx_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    voxx_account_id: Option<String>,
}

/// Session store backed by a local JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write(&self, stored: &StoredSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(stored)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn remove(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self) -> Result<Session, SessionError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Session::anonymous())
            }
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSession = serde_json::from_slice(&bytes)?;

        // Either value missing means nobody is logged in.
        match (stored.voxx_token, stored.voxx_account_id) {
            (Some(token), Some(account_id)) => {
                Ok(Session::authenticated(token, account_id).unwrap_or_default())
            }
            _ => Ok(Session::anonymous()),
        }
    }

    async fn set(&self, session: Session) -> Result<(), SessionError> {
        if session.is_authenticated() {
            let stored = StoredSession {
                voxx_token: Some(session.token().to_string()),
                voxx_account_id: Some(session.account_id().to_string()),
            };
            self.write(&stored).await?;
            tracing::debug!(path = ?self.path, "Session persisted");
        } else {
            self.remove().await?;
            tracing::debug!(path = ?self.path, "Session cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_is_anonymous() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        let session = store.get().await.unwrap();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_set_persists_both_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = FileSessionStore::new(&path);

        store
            .set(Session::authenticated("tok-9", "A1").unwrap())
            .await
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["voxx_token"], "tok-9");
        assert_eq!(raw["voxx_account_id"], "A1");

        // A fresh store over the same file sees the session.
        let reloaded = FileSessionStore::new(&path).get().await.unwrap();
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.token(), "tok-9");
    }

    #[tokio::test]
    async fn test_clear_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);

        store
            .set(Session::authenticated("tok", "A1").unwrap())
            .await
            .unwrap();
        store.clear().await.unwrap();

        assert!(!path.exists());
        assert!(!store.get().await.unwrap().is_authenticated());

        // Clearing twice is fine.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_setting_anonymous_clears() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);

        store
            .set(Session::authenticated("tok", "A1").unwrap())
            .await
            .unwrap();
        store.set(Session::anonymous()).await.unwrap();

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_half_written_file_is_anonymous() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"voxx_token": "tok"}"#).unwrap();

        let session = FileSessionStore::new(&path).get().await.unwrap();
        assert!(!session.is_authenticated());

        std::fs::write(&path, r#"{"voxx_token": "", "voxx_account_id": "A1"}"#).unwrap();
        let session = FileSessionStore::new(&path).get().await.unwrap();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileSessionStore::new(&path).get().await.unwrap_err();
        assert!(matches!(err, SessionError::Serialization(_)));
    }
}
