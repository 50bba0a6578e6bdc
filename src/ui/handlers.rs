//! Axum handlers for every view.
//!
//! Public handlers render forms and talk to the auth endpoints. Guarded
//! handlers sit behind [`crate::auth::middleware::require_role`] and receive
//! the decoded claims as an extension.

use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::AppState;
use crate::api::ApiError;
use crate::api::types::{
    Credentials, DashboardMetrics, NewBid, NewJob, PasswordResetRequest, ResetPasswordRequest,
    SignupRequest,
};
use crate::auth::{AuthError, DecodedClaims, Landing, Role};

use super::navigation::{LOGIN_PATH, is_htmx, navigate};
use super::pages;
use super::shell::html_shell;

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn page(title: &str, signed_in: Option<Role>, content: &str) -> Response {
    Html(html_shell(title, signed_in, content)).into_response()
}

/// HTMX submits get the bare form back for an in-place swap; plain posts get
/// the whole page.
fn form_response(
    headers: &HeaderMap,
    title: &str,
    signed_in: Option<Role>,
    form: &str,
    wrap: fn(&str) -> String,
) -> Response {
    if is_htmx(headers) {
        Html(form.to_string()).into_response()
    } else {
        page(title, signed_in, &wrap(form))
    }
}

/// A failed backend call inside a guarded view. A rejected session ends in
/// the login view; anything else is rendered inline.
fn api_failure(headers: &HeaderMap, role: Role, err: &ApiError) -> Response {
    match err {
        ApiError::Unauthorized => navigate(headers, LOGIN_PATH),
        other => {
            tracing::warn!(name: "ui.api.failed", error = %other, "Backend call failed");
            page("Error", Some(role), &pages::error_panel(&other.user_message()))
        }
    }
}

/// Greeting name from the cached user record. Display only.
fn display_name(state: &AppState) -> String {
    match state.sessions.read() {
        Ok(Some(session)) => session.user.display_name().to_string(),
        _ => "there".to_string(),
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    pub token: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Public views
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Marketing landing page.
pub async fn home() -> Response {
    page("Home", None, pages::home_content())
}

/// GET /login
pub async fn login_page() -> Response {
    page("Log in", None, &pages::login_content(&pages::login_form("", None)))
}

/// POST /login - Authenticate and dispatch by role.
pub async fn login_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(credentials): Form<Credentials>,
) -> Response {
    match state.login.login(&credentials).await {
        Ok(landing) => navigate(&headers, landing.path()),
        // The first submit is still running and will navigate; this one must not.
        Err(AuthError::LoginInFlight) => StatusCode::CONFLICT.into_response(),
        Err(e) => {
            let form = pages::login_form(&credentials.email, Some(e.user_message().as_str()));
            form_response(&headers, "Log in", None, &form, pages::login_content)
        }
    }
}

/// POST /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(e) = state.login.logout() {
        tracing::warn!(error = %e, "Failed to clear session on logout");
    }
    navigate(&headers, LOGIN_PATH)
}

/// GET /signup
pub async fn signup_page() -> Response {
    page(
        "Sign up",
        None,
        &pages::signup_content(&pages::signup_form(None, None)),
    )
}

/// POST /signup
pub async fn signup_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(req): Form<SignupRequest>,
) -> Response {
    // Admin accounts are provisioned by the backend, never self-registered.
    let error = match req.user_type.parse::<Role>() {
        Ok(Role::Client | Role::Engineer) => match state.api.auth().signup(&req).await {
            Ok(resp) => {
                let done = pages::signup_done(resp.message.as_deref());
                return form_response(&headers, "Sign up", None, &done, pages::signup_content);
            }
            Err(e) => e.user_message(),
        },
        Ok(Role::Admin) | Err(_) => "Choose an account type.".to_string(),
    };
    let form = pages::signup_form(Some(&req), Some(error.as_str()));
    form_response(&headers, "Sign up", None, &form, pages::signup_content)
}

/// GET /verify-email?token=...
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let Some(token) = query.token.filter(|t| !t.trim().is_empty()) else {
        return page(
            "Verify email",
            None,
            &pages::verify_email_content(Err("This verification link is missing its token.")),
        );
    };

    let content = match state.api.auth().verify_email(&token).await {
        Ok(resp) => pages::verify_email_content(Ok(resp
            .message
            .as_deref()
            .unwrap_or("Email verified. You can now log in."))),
        Err(e) => pages::verify_email_content(Err(e.user_message().as_str())),
    };
    page("Verify email", None, &content)
}

/// GET /forgot-password
pub async fn forgot_password_page() -> Response {
    page(
        "Reset password",
        None,
        &pages::forgot_password_content(&pages::forgot_password_form("", None)),
    )
}

/// POST /forgot-password
pub async fn forgot_password_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(req): Form<PasswordResetRequest>,
) -> Response {
    let form = match state.api.auth().request_password_reset(req.email.clone()).await {
        // Same wording whether or not the account exists.
        Ok(_) => pages::forgot_password_form(
            "",
            Some(Ok("If an account exists for that email, a reset link is on its way.")),
        ),
        Err(e) => {
            pages::forgot_password_form(&req.email, Some(Err(e.user_message().as_str())))
        }
    };
    form_response(
        &headers,
        "Reset password",
        None,
        &form,
        pages::forgot_password_content,
    )
}

/// GET /reset-password?token=...
pub async fn reset_password_page(Query(query): Query<TokenQuery>) -> Response {
    let form = match query.token.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(token) => pages::reset_password_form(token, None),
        None => pages::reset_password_form(
            "",
            Some(Err("This reset link is missing its token. Request a new one.")),
        ),
    };
    page(
        "Reset password",
        None,
        &pages::reset_password_content(&form),
    )
}

/// POST /reset-password
pub async fn reset_password_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(req): Form<ResetPasswordRequest>,
) -> Response {
    let form = match state.api.auth().reset_password(&req).await {
        Ok(resp) => pages::reset_password_form(
            &req.token,
            Some(Ok(resp
                .message
                .as_deref()
                .unwrap_or("Password updated. You can now log in."))),
        ),
        Err(e) => {
            pages::reset_password_form(&req.token, Some(Err(e.user_message().as_str())))
        }
    };
    form_response(
        &headers,
        "Reset password",
        None,
        &form,
        pages::reset_password_content,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Guarded views
// ─────────────────────────────────────────────────────────────────────────────

/// GET /client/dashboard
pub async fn client_dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    headers: HeaderMap,
) -> Response {
    let (dashboard, jobs) = (state.api.dashboard(), state.api.jobs());
    let (metrics, jobs) = tokio::join!(dashboard.metrics(), jobs.list());
    let (metrics, jobs) = match (metrics, jobs) {
        (Ok(metrics), Ok(jobs)) => (metrics, jobs),
        (Err(e), _) | (_, Err(e)) => return api_failure(&headers, claims.role, &e),
    };
    let content = pages::client_dashboard(&display_name(&state), &metrics, &jobs);
    page("Dashboard", Some(claims.role), &content)
}

/// GET /engineer/dashboard
pub async fn engineer_dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    headers: HeaderMap,
) -> Response {
    let (dashboard, bids) = (state.api.dashboard(), state.api.bids());
    let (metrics, bids) = tokio::join!(dashboard.metrics(), bids.mine());
    let (metrics, bids) = match (metrics, bids) {
        (Ok(metrics), Ok(bids)) => (metrics, bids),
        (Err(e), _) | (_, Err(e)) => return api_failure(&headers, claims.role, &e),
    };
    let content = pages::engineer_dashboard(&display_name(&state), &metrics, &bids);
    page("Dashboard", Some(claims.role), &content)
}

/// GET /admin/dashboard
pub async fn admin_dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    headers: HeaderMap,
) -> Response {
    let metrics: DashboardMetrics = match state.api.dashboard().metrics().await {
        Ok(metrics) => metrics,
        Err(e) => return api_failure(&headers, claims.role, &e),
    };
    let content = pages::admin_dashboard(&display_name(&state), &metrics);
    page("Admin", Some(claims.role), &content)
}

/// GET /jobs
pub async fn jobs_board(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    headers: HeaderMap,
) -> Response {
    match state.api.jobs().list().await {
        Ok(jobs) => page("Jobs", Some(claims.role), &pages::jobs_board(claims.role, &jobs)),
        Err(e) => api_failure(&headers, claims.role, &e),
    }
}

/// GET /jobs/{id}
pub async fn job_detail(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let job = match state.api.jobs().get(&id).await {
        Ok(job) => job,
        Err(e) => return api_failure(&headers, claims.role, &e),
    };
    // Clients see the bids on their job; engineers get the proposal form.
    let bids = if claims.role == Role::Client {
        match state.api.bids().list_for_job(&id).await {
            Ok(bids) => Some(bids),
            Err(e) => return api_failure(&headers, claims.role, &e),
        }
    } else {
        None
    };
    let content = pages::job_detail(claims.role, &job, bids.as_deref());
    page(&job.title, Some(claims.role), &content)
}

/// GET /jobs/new
pub async fn new_job_page(Extension(claims): Extension<DecodedClaims>) -> Response {
    page(
        "Post a job",
        Some(claims.role),
        &pages::new_job_content(&pages::new_job_form(None, None)),
    )
}

/// Posted job form. Budget arrives as free text.
#[derive(Debug, Deserialize)]
pub struct NewJobForm {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub budget: String,
}

impl NewJobForm {
    fn into_new_job(self) -> Result<NewJob, (NewJob, &'static str)> {
        let budget = self.budget.trim();
        let parsed = if budget.is_empty() {
            Ok(None)
        } else {
            budget
                .parse::<f64>()
                .ok()
                .filter(|b| b.is_finite() && *b >= 0.0)
                .map(Some)
                .ok_or("Budget must be a positive number.")
        };
        let job = NewJob {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            budget: parsed.ok().flatten(),
        };
        match parsed {
            Ok(_) => Ok(job),
            Err(message) => Err((job, message)),
        }
    }
}

/// POST /jobs/new
pub async fn new_job_submit(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    headers: HeaderMap,
    Form(form): Form<NewJobForm>,
) -> Response {
    let (job, error) = match form.into_new_job() {
        Ok(job) => match state.api.jobs().create(&job).await {
            Ok(created) => {
                tracing::info!(name: "ui.job.created", job_id = %created.id, "Job posted");
                return navigate(&headers, Landing::ClientDashboard.path());
            }
            Err(ApiError::Unauthorized) => return navigate(&headers, LOGIN_PATH),
            Err(e) => (job, e.user_message()),
        },
        Err((job, message)) => (job, message.to_string()),
    };
    let form = pages::new_job_form(Some(&job), Some(error.as_str()));
    form_response(
        &headers,
        "Post a job",
        Some(claims.role),
        &form,
        pages::new_job_content,
    )
}

/// Posted bid form.
#[derive(Debug, Deserialize)]
pub struct BidForm {
    pub amount: String,
    #[serde(default)]
    pub proposal: String,
}

/// POST /jobs/{id}/bids
pub async fn place_bid(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<BidForm>,
) -> Response {
    let amount = form
        .amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite() && *a > 0.0);

    let error = match amount {
        None => "Enter a price greater than zero.".to_string(),
        Some(amount) => {
            let bid = NewBid {
                job_id: id.clone(),
                amount,
                proposal: form.proposal.trim().to_string(),
            };
            match state.api.bids().create(&bid).await {
                Ok(_) => return navigate(&headers, Landing::EngineerDashboard.path()),
                Err(ApiError::Unauthorized) => return navigate(&headers, LOGIN_PATH),
                Err(e) => e.user_message(),
            }
        }
    };

    let form = pages::bid_form(&id, Some(error.as_str()));
    if is_htmx(&headers) {
        Html(form).into_response()
    } else {
        page("Place a bid", Some(claims.role), &form)
    }
}

/// GET /admin/users
pub async fn admin_users(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
    headers: HeaderMap,
) -> Response {
    match state.api.users().admin_list().await {
        Ok(users) => page("Users", Some(claims.role), &pages::admin_users(&users)),
        Err(e) => api_failure(&headers, claims.role, &e),
    }
}

/// GET /profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<DecodedClaims>,
) -> Response {
    let user = state.sessions.read().ok().flatten().map(|s| s.user);
    page(
        "Profile",
        Some(claims.role),
        &pages::profile(user.as_ref(), &claims),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(budget: &str) -> NewJobForm {
        NewJobForm {
            title: " Solar install ".into(),
            description: "4kW roof array".into(),
            location: "Leeds".into(),
            budget: budget.into(),
        }
    }

    #[test]
    fn test_blank_budget_is_none() {
        let job = form("  ").into_new_job().unwrap();
        assert_eq!(job.budget, None);
        assert_eq!(job.title, "Solar install");
    }

    #[test]
    fn test_budget_parsed() {
        assert_eq!(form("2500").into_new_job().unwrap().budget, Some(2500.0));
    }

    #[test]
    fn test_bad_budget_keeps_values_for_redisplay() {
        let (job, message) = form("lots").into_new_job().unwrap_err();
        assert_eq!(job.location, "Leeds");
        assert_eq!(message, "Budget must be a positive number.");
        assert!(form("-5").into_new_job().is_err());
    }
}
