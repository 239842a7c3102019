//! Session store port
//!
//! Persistent key-value storage for the current session. The file-backed
//! adapter is the production implementation; an in-memory one backs tests.

use crate::domain::result::Result;
use crate::domain::Session;

/// Storage for the one active session.
///
/// `save` must be atomic from the caller's perspective: no reader may ever
/// observe a partially written session. Last writer wins; there is no
/// transactional guarantee beyond that, which is acceptable because only
/// one authenticated identity is ever active at a time.
pub trait SessionStore: Send + Sync {
    fn save(&self, session: &Session) -> Result<()>;

    /// Current session, or `None` when logged out / expired
    fn load(&self) -> Result<Option<Session>>;

    fn clear(&self) -> Result<()>;
}
