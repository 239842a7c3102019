//! In-memory session store for tests and ephemeral sessions

use std::sync::Mutex;

use crate::domain::result::Result;
use crate::domain::Session;
use crate::ports::SessionStore;

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn clear(&self) -> Result<()> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}
