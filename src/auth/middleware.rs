use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::guard::{AccessGuard, GuardDecision, RoutePolicy};
use crate::ui::navigation::{LOGIN_PATH, navigate};

/// Guard plus the policy of the route group it protects.
#[derive(Debug, Clone)]
pub struct RouteGate {
    guard: AccessGuard,
    policy: Arc<RoutePolicy>,
}

impl RouteGate {
    pub fn new(guard: AccessGuard, policy: RoutePolicy) -> Self {
        Self {
            guard,
            policy: Arc::new(policy),
        }
    }
}

/// Render the wrapped view only when the guard grants access.
///
/// On grant the decoded claims are inserted as a request extension for the
/// handler. Every denial is the same redirect to the login view.
pub async fn require_role(
    State(gate): State<RouteGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.guard.check(&gate.policy) {
        GuardDecision::Granted(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        GuardDecision::Denied(_) => navigate(request.headers(), LOGIN_PATH),
    }
}
