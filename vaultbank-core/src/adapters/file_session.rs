//! File-backed session store
//!
//! Persists the session as `session.json` under the app directory. Writes
//! go to a temp file first and are renamed into place so a concurrent
//! reader never observes a half-written session.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::result::Result;
use crate::domain::Session;
use crate::ports::SessionStore;

const SESSION_FILE: &str = "session.json";

#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(app_dir: &Path) -> Self {
        Self {
            path: app_dir.join(SESSION_FILE),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(session)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        // A corrupt session file is treated as logged out rather than an error
        Ok(serde_json::from_str(&content).ok())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use tempfile::TempDir;

    fn session() -> Session {
        let mut s = Session::new("tok-123", Role::User);
        s.username = "alice".to_string();
        s.account_number = "AAAA-1111-2222-3333".to_string();
        s
    }

    #[test]
    fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        assert!(store.load().unwrap().is_none());

        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(session()));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing an already-empty store is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_save_overwrites_previous_session() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        store.save(&session()).unwrap();
        let mut admin = Session::new("tok-admin", Role::Admin);
        admin.username = "root".to_string();
        store.save(&admin).unwrap();

        assert_eq!(store.load().unwrap(), Some(admin));
    }

    #[test]
    fn test_corrupt_file_reads_as_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
