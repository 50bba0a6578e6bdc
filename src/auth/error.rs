//! Authentication and authorization failures.

use thiserror::Error;

use super::guard::DenyReason;
use super::role::UnknownRole;
use crate::api::ApiError;
use crate::session::SessionError;

/// Failure surfaced by the auth layer.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No session stored.
    #[error("not signed in")]
    Absent,

    /// Stored token could not be decoded.
    #[error("stored session is invalid")]
    Invalid,

    /// Stored token is past its expiry.
    #[error("session expired")]
    Expired,

    /// Valid session, role not allowed on the route.
    #[error("not permitted")]
    Forbidden,

    /// Login succeeded but the account type is outside the known roles.
    #[error("{0}")]
    UnknownRole(#[from] UnknownRole),

    /// A login for this portal is already in flight.
    #[error("a sign-in is already in progress")]
    LoginInFlight,

    /// Network or backend failure on an auth request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Local session storage failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<DenyReason> for AuthError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NoSession => AuthError::Absent,
            DenyReason::InvalidToken | DenyReason::StorageFailure => AuthError::Invalid,
            DenyReason::Expired => AuthError::Expired,
            DenyReason::WrongRole => AuthError::Forbidden,
        }
    }
}

/// Shown when the backend reports an account type the portal cannot route.
pub const UNKNOWN_ROLE_MESSAGE: &str =
    "Unknown account type. Please contact support to finish setting up your account.";

impl AuthError {
    /// Message to render next to the sign-in form.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::UnknownRole(_) => UNKNOWN_ROLE_MESSAGE.to_string(),
            AuthError::LoginInFlight => "Already signing you in…".to_string(),
            AuthError::Api(ApiError::Api { status: 400 | 401, message }) if !message.is_empty() => {
                message.clone()
            }
            AuthError::Api(ApiError::Api { status: 400 | 401, .. }) => {
                "Invalid email or password.".to_string()
            }
            AuthError::Api(e) => e.user_message(),
            AuthError::Session(_) => "Could not save your session on this device.".to_string(),
            AuthError::Absent | AuthError::Invalid | AuthError::Expired | AuthError::Forbidden => {
                "Please sign in.".to_string()
            }
        }
    }
}
