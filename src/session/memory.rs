//! Process-local session slot.

use std::sync::{PoisonError, RwLock};

use super::{CachedUser, Session, SessionError, SessionStore};

/// In-memory [`SessionStore`].
///
/// Lost when the process exits. Tests inject this in place of the file store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, token: &str, user: &CachedUser) -> Result<(), SessionError> {
        let session = Session {
            token: token.to_string(),
            user: user.clone(),
        };
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    fn read(&self) -> Result<Option<Session>, SessionError> {
        Ok(self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
