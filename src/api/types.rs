//! Request and response models for the marketplace REST API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::session::{CachedUser, string_or_number};

// =============================================================================
// Auth
// =============================================================================

/// Login form / request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response from `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: CachedUser,
}

/// Body for `POST /api/auth/signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub user_type: String,
}

/// Body for `POST /api/auth/request-password-reset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Body for `POST /api/auth/reset-password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Jobs & bids
// =============================================================================

/// A job posted by a client.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body for `POST /api/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

/// A bid placed by an engineer.
#[derive(Debug, Clone, Deserialize)]
pub struct Bid {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub job_id: String,
    pub amount: f64,
    #[serde(default)]
    pub proposal: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub engineer_name: Option<String>,
}

/// Body for `POST /api/bids`.
#[derive(Debug, Clone, Serialize)]
pub struct NewBid {
    pub job_id: String,
    pub amount: f64,
    pub proposal: String,
}

// =============================================================================
// Dashboard & admin
// =============================================================================

/// Headline numbers for a dashboard. The backend shapes these per role, so
/// they are kept as an ordered name/value map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct DashboardMetrics(pub BTreeMap<String, serde_json::Value>);

/// Row of `GET /api/users/admin/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub user_type: String,
    #[serde(default)]
    pub is_verified: Option<bool>,
}
