//! Access guard for protected views.
//!
//! Every navigation to a guarded view runs [`AccessGuard::check`] afresh.
//! Nothing is cached between navigations, because the session can be
//! cleared or expire between two renders.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::role::Role;
use super::token::{self, DecodedClaims};
use crate::session::SessionStore;

/// Roles allowed to reach a route.
///
/// An empty policy admits nobody.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    allowed_roles: BTreeSet<Role>,
}

impl RoutePolicy {
    pub fn allow(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed_roles: roles.into_iter().collect(),
        }
    }

    /// Policy admitting every declared role.
    pub fn any_role() -> Self {
        Self::allow(Role::ALL)
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }

    pub fn allowed_roles(&self) -> &BTreeSet<Role> {
        &self.allowed_roles
    }
}

/// Why a navigation was denied. Internal only: logged, never rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoSession,
    InvalidToken,
    Expired,
    WrongRole,
    StorageFailure,
}

impl DenyReason {
    /// Whether the stored session is known-bad and should be dropped.
    pub fn clears_session(self) -> bool {
        !matches!(self, DenyReason::NoSession)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DenyReason::NoSession => "no_session",
            DenyReason::InvalidToken => "invalid_token",
            DenyReason::Expired => "expired",
            DenyReason::WrongRole => "wrong_role",
            DenyReason::StorageFailure => "storage_failure",
        }
    }
}

/// Outcome of one guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Granted(DecodedClaims),
    Denied(DenyReason),
}

/// Decides whether the current session may render a guarded view.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    sessions: Arc<dyn SessionStore>,
}

impl AccessGuard {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    pub fn check(&self, policy: &RoutePolicy) -> GuardDecision {
        self.check_at(policy, Utc::now())
    }

    /// Run the guard as of `now`.
    ///
    /// Denials other than "no session" clear the store, so the next attempt
    /// fails fast without decoding a token already known to be unusable.
    pub fn check_at(&self, policy: &RoutePolicy, now: DateTime<Utc>) -> GuardDecision {
        let decision = self.evaluate(policy, now);

        if let GuardDecision::Denied(reason) = decision {
            tracing::debug!(
                name: "auth.guard.denied",
                reason = reason.as_str(),
                allowed = ?policy.allowed_roles(),
                "Navigation denied"
            );
            if reason.clears_session()
                && let Err(e) = self.sessions.clear()
            {
                tracing::warn!(error = %e, "Failed to clear rejected session");
            }
        }
        decision
    }

    fn evaluate(&self, policy: &RoutePolicy, now: DateTime<Utc>) -> GuardDecision {
        let session = match self.sessions.read() {
            Ok(Some(session)) => session,
            Ok(None) => return GuardDecision::Denied(DenyReason::NoSession),
            Err(e) => {
                tracing::warn!(error = %e, "Session storage unreadable");
                return GuardDecision::Denied(DenyReason::StorageFailure);
            }
        };

        let claims = match token::decode(&session.token) {
            Ok(claims) => claims,
            Err(_) => return GuardDecision::Denied(DenyReason::InvalidToken),
        };
        if claims.is_expired_at(now) {
            return GuardDecision::Denied(DenyReason::Expired);
        }
        if !policy.permits(claims.role) {
            return GuardDecision::Denied(DenyReason::WrongRole);
        }
        GuardDecision::Granted(claims)
    }
}
