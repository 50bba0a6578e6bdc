//! Client-side bearer token decoding.
//!
//! The portal reads identity and role claims straight out of the JWT payload
//! so it can route and guard views without a server round-trip. The
//! signature is not verified here; the backend re-validates the token on
//! every API call.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::role::Role;

/// The token could not be turned into claims.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid token: {0}")]
pub struct InvalidToken(pub String);

impl InvalidToken {
    fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Claims recovered from a bearer token. Never stored, always recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedClaims {
    pub subject_id: String,
    pub role: Role,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl DecodedClaims {
    /// Whether the token has expired as of now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Payload as issued by the backend. Field names vary between token
/// generations, so each spelling is read on its own and the first one
/// present wins.
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<serde_json::Value>,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    user_id: Option<serde_json::Value>,
    #[serde(default, rename = "userId")]
    user_id_camel: Option<serde_json::Value>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    user_type: Option<String>,
    #[serde(default, rename = "userType")]
    user_type_camel: Option<String>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
}

impl RawClaims {
    fn subject(&self) -> Option<&serde_json::Value> {
        [&self.sub, &self.id, &self.user_id, &self.user_id_camel]
            .into_iter()
            .find_map(Option::as_ref)
    }

    fn role(&self) -> Option<&str> {
        [&self.role, &self.user_type, &self.user_type_camel]
            .into_iter()
            .find_map(Option::as_deref)
    }
}

/// Decode `token` into [`DecodedClaims`].
///
/// Fails closed: an empty, malformed or incomplete token, or one whose role
/// is outside the declared role set, is rejected rather than mapped to a
/// default.
pub fn decode(token: &str) -> Result<DecodedClaims, InvalidToken> {
    let token = token.trim();
    if token.is_empty() {
        return Err(InvalidToken::new("empty token"));
    }

    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(InvalidToken::new("expected three dot-separated segments"));
    };
    jsonwebtoken::decode_header(token)
        .map_err(|e| InvalidToken::new(format!("bad header: {e}")))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| InvalidToken::new(format!("payload is not base64url: {e}")))?;
    let raw: RawClaims = serde_json::from_slice(&bytes)
        .map_err(|e| InvalidToken::new(format!("payload is not a claims object: {e}")))?;

    let subject_id = match raw.subject() {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => return Err(InvalidToken::new("missing subject")),
    };
    let role = raw
        .role()
        .ok_or_else(|| InvalidToken::new("missing role claim"))?
        .parse::<Role>()
        .map_err(|e| InvalidToken::new(e.to_string()))?;
    let expires_at = raw
        .exp
        .and_then(|exp| DateTime::from_timestamp(exp, 0))
        .ok_or_else(|| InvalidToken::new("missing or out-of-range exp"))?;
    let issued_at = raw.iat.and_then(|iat| DateTime::from_timestamp(iat, 0));

    Ok(DecodedClaims {
        subject_id,
        role,
        issued_at,
        expires_at,
    })
}
