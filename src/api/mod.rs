//! HTTP gateway to the marketplace backend.
//!
//! Every outbound request passes through [`ApiClient`], which reads the
//! session slot and attaches `Authorization: Bearer <token>` when a token is
//! present. Endpoints that take credentials (login, signup, password reset)
//! are sent the same way, but a `401` from them is a wrong password rather
//! than a dead session, so only session-scoped calls clear the store.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use renewhire_portal::api::ApiClient;
//! use renewhire_portal::session::MemorySessionStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = ApiClient::new(
//!     "http://localhost:5000",
//!     Duration::from_secs(15),
//!     Arc::new(MemorySessionStore::new()),
//! )?;
//! let jobs = api.jobs().list().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

pub use error::{ApiError, Result};
use types::{
    AdminUser, Bid, Credentials, DashboardMetrics, Job, LoginResponse, MessageResponse, NewBid,
    NewJob, PasswordResetRequest, ResetPasswordRequest, SignupRequest,
};

use crate::session::SessionStore;

/// How a `401` on a request should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Request acts on behalf of the stored session.
    Session,
    /// Request submits credentials of its own.
    Credentials,
}

/// Bearer-attaching client for the marketplace API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    sessions: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// Create a client whose requests time out after `timeout`.
    pub fn new(
        base_url: impl AsRef<str>,
        timeout: Duration,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, http, sessions)
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        http: reqwest::Client,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        // Endpoint paths resolve beneath the base path, which needs the slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            http,
            sessions,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the Auth API.
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    /// Access the Jobs API.
    pub fn jobs(&self) -> JobsApi<'_> {
        JobsApi { client: self }
    }

    /// Access the Bids API.
    pub fn bids(&self) -> BidsApi<'_> {
        BidsApi { client: self }
    }

    /// Access the Dashboard API.
    pub fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi { client: self }
    }

    /// Access the Users API.
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi { client: self }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Endpoint URL for `path`, kept under any prefix of the base URL.
    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Endpoint URL for `path` followed by `segment` as one encoded path
    /// segment, so `/` or `..` inside an id cannot reach another endpoint.
    fn url_with_segment(&self, path: &str, segment: &str) -> Result<Url> {
        if matches!(segment.trim(), "" | "." | "..") {
            return Err(ApiError::InvalidPathSegment(segment.to_string()));
        }
        let mut endpoint = self.url(path)?;
        {
            let mut segments = endpoint.path_segments_mut().map_err(|()| {
                ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?;
            segments.pop_if_empty().push(segment);
        }
        Ok(endpoint)
    }

    /// Attach the stored bearer token, if any.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.sessions.read() {
            Ok(Some(session)) => request.bearer_auth(session.token),
            Ok(None) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Session unreadable, sending request unauthenticated");
                request
            }
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        scope: Scope,
    ) -> Result<T> {
        let response = self.authorize(request).send().await.map_err(|e| {
            tracing::warn!(name: "api.request.failed", error = %e, "API request failed");
            ApiError::from(e)
        })?;
        self.handle_response(response, scope).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        scope: Scope,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            // Some acknowledgements come back with an empty body.
            let body: &[u8] = if body.is_empty() { b"{}" } else { &body };
            return Ok(serde_json::from_slice(body)?);
        }

        if status == StatusCode::UNAUTHORIZED && scope == Scope::Session {
            tracing::info!(
                name: "api.session.rejected",
                url = %response.url().path(),
                "Backend rejected session, clearing"
            );
            if let Err(e) = self.sessions.clear() {
                tracing::warn!(error = %e, "Failed to clear rejected session");
            }
            return Err(ApiError::Unauthorized);
        }

        let text = response.text().await.unwrap_or_default();
        Err(ApiError::Api {
            status: status.as_u16(),
            message: error_message(&text),
        })
    }
}

/// Pull a human message out of an error body (`{"message": ..}` or
/// `{"error": ..}`), falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error", "msg"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

// =============================================================================
// Auth API
// =============================================================================

/// Auth API client.
#[derive(Debug)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl AuthApi<'_> {
    /// Exchange credentials for a bearer token and user record.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let request = self
            .client
            .http
            .post(self.client.url("/api/auth/login")?)
            .json(credentials);
        self.client.send(request, Scope::Credentials).await
    }

    /// Register a new account.
    pub async fn signup(&self, req: &SignupRequest) -> Result<MessageResponse> {
        let request = self
            .client
            .http
            .post(self.client.url("/api/auth/signup")?)
            .json(req);
        self.client.send(request, Scope::Credentials).await
    }

    /// Confirm an email address with the token from the verification link.
    pub async fn verify_email(&self, token: &str) -> Result<MessageResponse> {
        let mut url = self.client.url("/api/auth/verify-email")?;
        url.query_pairs_mut().append_pair("token", token);
        let request = self.client.http.get(url);
        self.client.send(request, Scope::Credentials).await
    }

    /// Ask for a password reset email.
    pub async fn request_password_reset(&self, email: impl Into<String>) -> Result<MessageResponse> {
        let req = PasswordResetRequest {
            email: email.into(),
        };
        let request = self
            .client
            .http
            .post(self.client.url("/api/auth/request-password-reset")?)
            .json(&req);
        self.client.send(request, Scope::Credentials).await
    }

    /// Set a new password using a reset token.
    pub async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<MessageResponse> {
        let request = self
            .client
            .http
            .post(self.client.url("/api/auth/reset-password")?)
            .json(req);
        self.client.send(request, Scope::Credentials).await
    }
}

// =============================================================================
// Jobs API
// =============================================================================

/// Jobs API client.
#[derive(Debug)]
pub struct JobsApi<'a> {
    client: &'a ApiClient,
}

impl JobsApi<'_> {
    /// List jobs visible to the current user.
    pub async fn list(&self) -> Result<Vec<Job>> {
        let request = self.client.http.get(self.client.url("/api/jobs")?);
        self.client.send(request, Scope::Session).await
    }

    /// Get a job by ID.
    pub async fn get(&self, id: &str) -> Result<Job> {
        let request = self
            .client
            .http
            .get(self.client.url_with_segment("/api/jobs", id)?);
        self.client.send(request, Scope::Session).await
    }

    /// Post a new job.
    pub async fn create(&self, job: &NewJob) -> Result<Job> {
        let request = self
            .client
            .http
            .post(self.client.url("/api/jobs")?)
            .json(job);
        self.client.send(request, Scope::Session).await
    }
}

// =============================================================================
// Bids API
// =============================================================================

/// Bids API client.
#[derive(Debug)]
pub struct BidsApi<'a> {
    client: &'a ApiClient,
}

impl BidsApi<'_> {
    /// Bids placed on one job.
    pub async fn list_for_job(&self, job_id: &str) -> Result<Vec<Bid>> {
        let request = self
            .client
            .http
            .get(self.client.url_with_segment("/api/bids/job", job_id)?);
        self.client.send(request, Scope::Session).await
    }

    /// Bids placed by the current engineer.
    pub async fn mine(&self) -> Result<Vec<Bid>> {
        let request = self.client.http.get(self.client.url("/api/bids/my-bids")?);
        self.client.send(request, Scope::Session).await
    }

    /// Place a bid.
    pub async fn create(&self, bid: &NewBid) -> Result<Bid> {
        let request = self
            .client
            .http
            .post(self.client.url("/api/bids")?)
            .json(bid);
        self.client.send(request, Scope::Session).await
    }
}

// =============================================================================
// Dashboard API
// =============================================================================

/// Dashboard API client.
#[derive(Debug)]
pub struct DashboardApi<'a> {
    client: &'a ApiClient,
}

impl DashboardApi<'_> {
    /// Headline metrics for the signed-in user's dashboard.
    pub async fn metrics(&self) -> Result<DashboardMetrics> {
        let request = self
            .client
            .http
            .get(self.client.url("/api/dashboard/metrics")?);
        self.client.send(request, Scope::Session).await
    }
}

// =============================================================================
// Users API
// =============================================================================

/// Users API client.
#[derive(Debug)]
pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl UsersApi<'_> {
    /// All marketplace accounts (admin only on the backend).
    pub async fn admin_list(&self) -> Result<Vec<AdminUser>> {
        let request = self
            .client
            .http
            .get(self.client.url("/api/users/admin/users")?);
        self.client.send(request, Scope::Session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(
            base_url,
            Duration::from_secs(5),
            Arc::new(MemorySessionStore::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        for base in ["http://host/backend", "http://host/backend/"] {
            let api = client(base);
            assert_eq!(
                api.url("/api/jobs").unwrap().as_str(),
                "http://host/backend/api/jobs"
            );
        }
        assert_eq!(
            client("http://host").url("/api/jobs").unwrap().as_str(),
            "http://host/api/jobs"
        );
    }

    #[test]
    fn test_id_is_one_encoded_segment() {
        let api = client("http://host/backend/");
        let url = api
            .url_with_segment("/api/jobs", "../users/admin/users")
            .unwrap();
        assert_eq!(url.path(), "/backend/api/jobs/..%2Fusers%2Fadmin%2Fusers");

        let url = api.url_with_segment("/api/bids/job", "42").unwrap();
        assert_eq!(url.as_str(), "http://host/backend/api/bids/job/42");
    }

    #[test]
    fn test_dot_segments_rejected() {
        let api = client("http://host/");
        for id in ["", " ", ".", ".."] {
            assert!(
                matches!(
                    api.url_with_segment("/api/jobs", id),
                    Err(ApiError::InvalidPathSegment(_))
                ),
                "accepted {id:?}"
            );
        }
    }

    #[test]
    fn test_error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"message":"Invalid credentials"}"#), "Invalid credentials");
        assert_eq!(error_message(r#"{"error":"Job not found"}"#), "Job not found");
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(error_message(r#"{"status":"fail"}"#), r#"{"status":"fail"}"#);
    }
}
