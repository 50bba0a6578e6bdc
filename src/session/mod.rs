//! Sign-in session storage.
//!
//! A session is one logical slot holding the bearer token issued by the
//! marketplace backend and a cached copy of the user record that came back
//! with it. The slot is overwritten wholesale on every login and emptied on
//! logout; it is never patched in place.
//!
//! # Architecture
//!
//! - [`SessionStore`]: the injectable storage seam (`save` / `read` / `clear`)
//! - [`MemorySessionStore`]: process-local slot, used by tests and ephemeral runs
//! - [`FileSessionStore`]: key/value file that survives an app restart
//!
//! # Example
//!
//! ```rust
//! use renewhire_portal::session::{CachedUser, MemorySessionStore, SessionStore};
//!
//! let store = MemorySessionStore::new();
//! let user = CachedUser::new("42", "client");
//! store.save("token-value", &user).unwrap();
//!
//! let session = store.read().unwrap().expect("session present");
//! assert_eq!(session.token, "token-value");
//!
//! store.clear().unwrap();
//! assert!(store.read().unwrap().is_none());
//! ```

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the JSON-serialized user record.
pub const USER_KEY: &str = "user";

/// Errors raised by a session backend.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Reading or writing the storage file failed.
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored values could not be (de)serialized.
    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Cached projection of the signed-in user.
///
/// Display data only. Authorization decisions use the role decoded from the
/// token, never `role` here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawUser")]
pub struct CachedUser {
    /// Backend user id, when the response carries one. Numeric ids are
    /// normalised to strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Account type as reported by the backend. Empty when it sent none.
    #[serde(rename = "user_type")]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Any further fields the backend returned, kept so the stored record
    /// matches the login response.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// User record as it arrives on the wire. `user_type` and `role` are read
/// separately so an object carrying both still parses.
#[derive(Deserialize)]
struct RawUser {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    id: Option<String>,
    #[serde(default)]
    user_type: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<RawUser> for CachedUser {
    fn from(raw: RawUser) -> Self {
        let mut extra = raw.extra;
        let role = match (raw.user_type, raw.role) {
            // `user_type` wins; the other key is kept as-is.
            (Some(user_type), Some(role)) => {
                extra.insert("role".to_string(), serde_json::Value::String(role));
                user_type
            }
            (Some(role), None) | (None, Some(role)) => role,
            (None, None) => String::new(),
        };
        Self {
            id: raw.id,
            role,
            name: raw.name,
            email: raw.email,
            extra,
        }
    }
}

impl CachedUser {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            role: role.into(),
            name: None,
            email: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Name to greet the user with, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("there")
    }
}

/// A persisted token and its cached user record.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: CachedUser,
}

/// Single-slot session storage.
///
/// Implementations must make `save` atomic from the caller's point of view:
/// a concurrent `read` sees either the old pair or the new pair, never a
/// token from one login next to the user from another.
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Replace the stored session with `token` and `user`.
    fn save(&self, token: &str, user: &CachedUser) -> Result<(), SessionError>;

    /// Current session, or `None` if nothing was saved or it was cleared.
    fn read(&self) -> Result<Option<Session>, SessionError>;

    /// Remove both the token and the user record.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Accept ids as either JSON strings or numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Like [`string_or_number`], for fields that may be absent or `null`.
fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cached_user_accepts_numeric_id_and_user_type() {
        let user: CachedUser = serde_json::from_value(json!({
            "id": 17,
            "user_type": "engineer",
            "name": "Ada",
            "company": "Sunworks"
        }))
        .unwrap();

        assert_eq!(user.id.as_deref(), Some("17"));
        assert_eq!(user.role, "engineer");
        assert_eq!(user.display_name(), "Ada");
        assert_eq!(user.extra.get("company"), Some(&json!("Sunworks")));
    }

    #[test]
    fn test_cached_user_without_id() {
        let user: CachedUser = serde_json::from_value(json!({ "user_type": "client" })).unwrap();
        assert_eq!(user.id, None);
        assert_eq!(user.role, "client");
        assert_eq!(serde_json::to_value(&user).unwrap(), json!({ "user_type": "client" }));
    }

    #[test]
    fn test_cached_user_with_user_type_and_role() {
        let user: CachedUser = serde_json::from_value(json!({
            "id": 1,
            "user_type": "client",
            "role": "member"
        }))
        .unwrap();

        assert_eq!(user.role, "client");
        assert_eq!(user.extra.get("role"), Some(&json!("member")));

        // Survives a store round trip unchanged.
        let stored = serde_json::to_string(&user).unwrap();
        assert_eq!(serde_json::from_str::<CachedUser>(&stored).unwrap(), user);
    }

    #[test]
    fn test_cached_user_role_only() {
        let user: CachedUser =
            serde_json::from_value(json!({ "id": null, "role": "engineer" })).unwrap();
        assert_eq!(user.id, None);
        assert_eq!(user.role, "engineer");
        assert!(user.extra.is_empty());
    }

    #[test]
    fn test_cached_user_serializes_role_as_user_type() {
        let user = CachedUser::new("1", "admin");
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value, json!({ "id": "1", "user_type": "admin" }));
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut user = CachedUser::new("1", "client");
        user.email = Some("a@b.com".into());
        assert_eq!(user.display_name(), "a@b.com");
    }
}
