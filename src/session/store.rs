use std::fs;
use std::path::{Path, PathBuf};

use super::{Session, SessionError};

/// Session persisted as JSON on disk
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `session.json` inside `config_dir`
    pub fn in_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| SessionError::Storage(e.to_string()))?;
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A damaged session file only means signing in again
                tracing::warn!("Ignoring unreadable session file {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SessionError::Storage(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(session).map_err(|e| SessionError::Storage(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| SessionError::Storage(e.to_string()))
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn temp_store() -> SessionStore {
        let dir = std::env::temp_dir().join(format!("haven_session_{}", Uuid::new_v4().simple()));
        SessionStore::in_dir(&dir)
    }

    #[test]
    fn test_save_load_clear() {
        let store = temp_store();
        assert_eq!(store.load().unwrap(), None);

        let now = Utc::now();
        let session = Session {
            email: "admin@example.com".to_string(),
            user_id: Some("u1".to_string()),
            token: "token".to_string(),
            issued_at: now,
            expires_at: now + Duration::hours(1),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();

        if let Some(dir) = store.path().parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_corrupt_file_loads_as_signed_out() {
        let store = temp_store();
        if let Some(parent) = store.path().parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load().unwrap(), None);
        let _ = fs::remove_dir_all(store.path().parent().unwrap());
    }
}
