//! File-backed session slot.
//!
//! The file is a flat JSON object of string keys to string values, the same
//! shape as browser local storage: the token lives under [`TOKEN_KEY`] and
//! the JSON-encoded user record under [`USER_KEY`]. Unrelated keys written by
//! other tools are preserved.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{CachedUser, Session, SessionError, SessionStore, TOKEN_KEY, USER_KEY};

type Entries = BTreeMap<String, String>;

/// [`SessionStore`] persisted to a local file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Entries, SessionError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(Entries::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file, then rename over the target so readers
    /// never observe a half-written file.
    fn store(&self, entries: &Entries) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, token: &str, user: &CachedUser) -> Result<(), SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        entries.insert(USER_KEY.to_string(), serde_json::to_string(user)?);
        self.store(&entries)?;

        tracing::debug!(
            name: "session.saved",
            path = %self.path.display(),
            user_id = ?user.id,
            "Session persisted"
        );
        Ok(())
    }

    fn read(&self) -> Result<Option<Session>, SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;

        // Both halves or nothing.
        let (Some(token), Some(user)) = (entries.remove(TOKEN_KEY), entries.remove(USER_KEY))
        else {
            return Ok(None);
        };
        let user: CachedUser = serde_json::from_str(&user)?;
        Ok(Some(Session { token, user }))
    }

    fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        let had_token = entries.remove(TOKEN_KEY).is_some();
        let had_user = entries.remove(USER_KEY).is_some();
        if !had_token && !had_user {
            return Ok(());
        }

        if entries.is_empty() {
            match fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        } else {
            self.store(&entries)?;
        }

        tracing::debug!(name: "session.cleared", path = %self.path.display(), "Session cleared");
        Ok(())
    }
}
