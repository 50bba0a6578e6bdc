//! Sign-in flow: credentials in, persisted session and landing view out.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::error::AuthError;
use super::router::{Landing, route_login};
use crate::api::types::Credentials;
use crate::api::{ApiClient, ApiError};
use crate::session::SessionStore;

/// Runs at most one sign-in at a time.
///
/// A second submit while the first is in flight is rejected with
/// [`AuthError::LoginInFlight`] and causes no navigation.
#[derive(Debug)]
pub struct LoginFlow {
    api: ApiClient,
    sessions: Arc<dyn SessionStore>,
    in_flight: Mutex<()>,
}

impl LoginFlow {
    pub fn new(api: ApiClient, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            sessions,
            in_flight: Mutex::new(()),
        }
    }

    /// Authenticate, persist the session, and pick the landing view.
    ///
    /// The role comes from the login response, which is the freshest source
    /// at this moment. An unroutable role is reported before anything is
    /// persisted, and a failed attempt leaves any existing session untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<Landing, AuthError> {
        let Ok(_permit) = self.in_flight.try_lock() else {
            tracing::debug!(name: "auth.login.duplicate", "Sign-in already in flight");
            return Err(AuthError::LoginInFlight);
        };

        let response = self.api.auth().login(credentials).await.inspect_err(|e| {
            tracing::info!(name: "auth.login.failed", error = %e, "Sign-in failed");
        })?;

        let landing = route_login(&response.user.role).inspect_err(|e| {
            tracing::warn!(
                name: "auth.login.unknown_role",
                user_id = ?response.user.id,
                error = %e,
                "Sign-in returned an unroutable account type"
            );
        })?;

        if response.token.trim().is_empty() {
            return Err(ApiError::InvalidResponse("login response carried no token".into()).into());
        }

        self.sessions.save(&response.token, &response.user)?;
        tracing::info!(
            name: "auth.login.succeeded",
            user_id = ?response.user.id,
            landing = landing.path(),
            "Signed in"
        );
        Ok(landing)
    }

    /// Forget the current session.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.sessions.clear()?;
        tracing::info!(name: "auth.logout", "Signed out");
        Ok(())
    }
}
