//! Page bodies. Everything user- or backend-supplied goes through
//! [`esc`]/[`attr`] before it lands in markup.

use crate::api::types::{AdminUser, Bid, DashboardMetrics, Job, NewJob, SignupRequest};
use crate::auth::{DecodedClaims, Role};
use crate::session::CachedUser;

use super::shell::{Tone, alert, attr, esc, field, submit_button};

fn card(inner: &str) -> String {
    format!(r#"<div class="rounded-3xl bg-surface p-6 md:p-8 shadow-lg space-y-4">{inner}</div>"#)
}

fn heading(text: &str) -> String {
    format!(r#"<h1 class="text-2xl font-bold">{}</h1>"#, esc(text))
}

fn maybe_alert(tone: Tone, message: Option<&str>) -> String {
    message.map(|m| alert(tone, m)).unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Public pages
// ─────────────────────────────────────────────────────────────────────────────

/// Marketing landing page.
pub fn home_content() -> &'static str {
    r#"
    <div class="space-y-6">
        <div class="rounded-3xl bg-surface p-8 shadow-lg">
            <h1 class="text-3xl font-bold mb-4">Renewable-energy talent, on demand</h1>
            <p class="text-textMuted mb-8">
                RenewHire connects homeowners and businesses with vetted engineers and
                technicians for solar, wind, battery storage and EV-charging projects.
            </p>

            <div class="grid gap-4 md:grid-cols-3">
                <div class="p-5 rounded-2xl bg-surfaceVariant">
                    <h3 class="font-semibold mb-2">Post a job</h3>
                    <p class="text-sm text-textMuted">Describe the installation or repair and set a budget.</p>
                </div>
                <div class="p-5 rounded-2xl bg-surfaceVariant">
                    <h3 class="font-semibold mb-2">Compare bids</h3>
                    <p class="text-sm text-textMuted">Qualified engineers send proposals; pick the one that fits.</p>
                </div>
                <div class="p-5 rounded-2xl bg-surfaceVariant">
                    <h3 class="font-semibold mb-2">Get it built</h3>
                    <p class="text-sm text-textMuted">Track progress and talk to your engineer in one place.</p>
                </div>
            </div>

            <div class="mt-8 flex gap-3">
                <a href="/signup" class="inline-flex items-center h-12 px-6 rounded-2xl bg-primary text-white hover:bg-primaryMuted font-medium">Get started</a>
                <a href="/login" class="inline-flex items-center h-12 px-6 rounded-2xl bg-surfaceVariant font-medium">Log in</a>
            </div>
        </div>
    </div>
    "#
}

/// Sign-in form. Swaps itself on HTMX submit; the button is disabled while
/// the request is in flight.
pub fn login_form(email: &str, error: Option<&str>) -> String {
    format!(
        r#"<form id="login-form" method="post" action="/login" class="space-y-4"
            hx-post="/login" hx-target="this" hx-swap="outerHTML" hx-disabled-elt="find button">
            {error}
            {email}
            {password}
            {button}
            <div class="flex justify-between text-sm">
                <a href="/forgot-password" class="text-primary">Forgot password?</a>
                <a href="/signup" class="text-primary">Create an account</a>
            </div>
        </form>"#,
        error = maybe_alert(Tone::Error, error),
        email = field("Email", "email", "email", email),
        password = field("Password", "password", "password", ""),
        button = submit_button("Log in"),
    )
}

pub fn login_content(form: &str) -> String {
    card(&format!("{}{form}", heading("Log in")))
}

pub fn signup_form(values: Option<&SignupRequest>, error: Option<&str>) -> String {
    let (name, email, user_type) = values
        .map(|v| (v.name.as_str(), v.email.as_str(), v.user_type.as_str()))
        .unwrap_or(("", "", "client"));
    let option = |value: &str, label: &str| {
        let selected = if value == user_type { " selected" } else { "" };
        format!(r#"<option value="{value}"{selected}>{label}</option>"#)
    };
    format!(
        r#"<form id="signup-form" method="post" action="/signup" class="space-y-4"
            hx-post="/signup" hx-target="this" hx-swap="outerHTML" hx-disabled-elt="find button">
            {error}
            {name}
            {email}
            {password}
            <label class="block space-y-1">
                <span class="text-sm font-medium">I want to</span>
                <select name="user_type" class="w-full h-11 px-4 rounded-xl bg-surface">
                    {client}
                    {engineer}
                </select>
            </label>
            {button}
        </form>"#,
        error = maybe_alert(Tone::Error, error),
        name = field("Full name", "name", "text", name),
        email = field("Email", "email", "email", email),
        password = field("Password", "password", "password", ""),
        client = option("client", "Hire an engineer"),
        engineer = option("engineer", "Find work as an engineer"),
        button = submit_button("Create account"),
    )
}

pub fn signup_content(form: &str) -> String {
    card(&format!("{}{form}", heading("Create your account")))
}

/// Shown in place of the signup form once the backend accepted it.
pub fn signup_done(message: Option<&str>) -> String {
    let message =
        message.unwrap_or("Account created. Check your inbox for a link to verify your email.");
    format!(
        r#"<div id="signup-form" class="space-y-4">{}<a href="/login" class="text-primary">Continue to log in</a></div>"#,
        alert(Tone::Success, message)
    )
}

pub fn verify_email_content(outcome: Result<&str, &str>) -> String {
    let banner = match outcome {
        Ok(message) => alert(Tone::Success, message),
        Err(message) => alert(Tone::Error, message),
    };
    card(&format!(
        r#"{}{banner}<a href="/login" class="text-primary">Go to log in</a>"#,
        heading("Email verification")
    ))
}

pub fn forgot_password_form(email: &str, outcome: Option<Result<&str, &str>>) -> String {
    let banner = match outcome {
        Some(Ok(message)) => alert(Tone::Success, message),
        Some(Err(message)) => alert(Tone::Error, message),
        None => String::new(),
    };
    format!(
        r#"<form id="forgot-form" method="post" action="/forgot-password" class="space-y-4"
            hx-post="/forgot-password" hx-target="this" hx-swap="outerHTML" hx-disabled-elt="find button">
            {banner}
            {email}
            {button}
        </form>"#,
        email = field("Email", "email", "email", email),
        button = submit_button("Send reset link"),
    )
}

pub fn forgot_password_content(form: &str) -> String {
    card(&format!("{}{form}", heading("Reset your password")))
}

pub fn reset_password_form(token: &str, outcome: Option<Result<&str, &str>>) -> String {
    if let Some(Ok(message)) = outcome {
        return format!(
            r#"<div id="reset-form" class="space-y-4">{}<a href="/login" class="text-primary">Log in</a></div>"#,
            alert(Tone::Success, message)
        );
    }
    let banner = match outcome {
        Some(Err(message)) => alert(Tone::Error, message),
        _ => String::new(),
    };
    format!(
        r#"<form id="reset-form" method="post" action="/reset-password" class="space-y-4"
            hx-post="/reset-password" hx-target="this" hx-swap="outerHTML" hx-disabled-elt="find button">
            {banner}
            <input type="hidden" name="token" value="{token}">
            {password}
            {button}
        </form>"#,
        token = attr(token),
        password = field("New password", "password", "password", ""),
        button = submit_button("Set new password"),
    )
}

pub fn reset_password_content(form: &str) -> String {
    card(&format!("{}{form}", heading("Choose a new password")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Guarded pages
// ─────────────────────────────────────────────────────────────────────────────

/// Inline panel for a backend failure inside a guarded view.
pub fn error_panel(message: &str) -> String {
    card(&format!("{}{}", heading("Something went wrong"), alert(Tone::Error, message)))
}

fn metrics_grid(metrics: &DashboardMetrics) -> String {
    if metrics.0.is_empty() {
        return String::new();
    }
    let tiles: String = metrics
        .0
        .iter()
        .map(|(name, value)| {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!(
                r#"<div class="p-5 rounded-2xl bg-surfaceVariant"><p class="text-sm text-textMuted">{}</p><p class="text-2xl font-semibold">{}</p></div>"#,
                esc(&name.replace('_', " ")),
                esc(&value)
            )
        })
        .collect();
    format!(r#"<div class="grid gap-4 md:grid-cols-3">{tiles}</div>"#)
}

fn job_rows(jobs: &[Job]) -> String {
    if jobs.is_empty() {
        return r#"<p class="text-sm text-textMuted">No jobs yet.</p>"#.to_string();
    }
    let rows: String = jobs
        .iter()
        .map(|job| {
            let meta = [
                job.location.as_deref().map(|l| esc(l).into_owned()),
                job.budget.map(|b| format!("${b:.0}")),
                job.status.as_deref().map(|s| esc(s).into_owned()),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" · ");
            format!(
                r#"<li class="p-4 rounded-2xl bg-surfaceVariant"><a href="/jobs/{id}" class="font-semibold">{title}</a><p class="text-sm text-textMuted">{meta}</p></li>"#,
                id = attr(&job.id),
                title = esc(&job.title),
            )
        })
        .collect();
    format!(r#"<ul class="space-y-3">{rows}</ul>"#)
}

fn bid_rows(bids: &[Bid]) -> String {
    if bids.is_empty() {
        return r#"<p class="text-sm text-textMuted">No bids yet.</p>"#.to_string();
    }
    let rows: String = bids
        .iter()
        .map(|bid| {
            format!(
                r#"<li class="p-4 rounded-2xl bg-surfaceVariant"><a href="/jobs/{job}" class="font-semibold">${amount:.2}</a> <span class="text-sm text-textMuted">{who} {status}</span><p class="text-sm">{proposal}</p></li>"#,
                job = attr(&bid.job_id),
                amount = bid.amount,
                who = esc(bid.engineer_name.as_deref().unwrap_or("")),
                status = esc(bid.status.as_deref().unwrap_or("pending")),
                proposal = esc(bid.proposal.as_deref().unwrap_or("")),
            )
        })
        .collect();
    format!(r#"<ul class="space-y-3">{rows}</ul>"#)
}

pub fn client_dashboard(name: &str, metrics: &DashboardMetrics, jobs: &[Job]) -> String {
    card(&format!(
        r#"{}{}<div class="flex items-center justify-between"><h2 class="font-semibold">Your jobs</h2><a href="/jobs/new" class="text-primary">Post a job</a></div>{}"#,
        heading(&format!("Welcome back, {name}")),
        metrics_grid(metrics),
        job_rows(jobs),
    ))
}

pub fn engineer_dashboard(name: &str, metrics: &DashboardMetrics, bids: &[Bid]) -> String {
    card(&format!(
        r#"{}{}<div class="flex items-center justify-between"><h2 class="font-semibold">Your bids</h2><a href="/jobs" class="text-primary">Find work</a></div>{}"#,
        heading(&format!("Welcome back, {name}")),
        metrics_grid(metrics),
        bid_rows(bids),
    ))
}

pub fn admin_dashboard(name: &str, metrics: &DashboardMetrics) -> String {
    card(&format!(
        r#"{}{}<a href="/admin/users" class="text-primary">Manage users</a>"#,
        heading(&format!("Marketplace overview for {name}")),
        metrics_grid(metrics),
    ))
}

pub fn jobs_board(role: Role, jobs: &[Job]) -> String {
    let title = match role {
        Role::Engineer => "Open jobs",
        Role::Client | Role::Admin => "Jobs",
    };
    card(&format!("{}{}", heading(title), job_rows(jobs)))
}

pub fn bid_form(job_id: &str, error: Option<&str>) -> String {
    format!(
        r#"<form id="bid-form" method="post" action="/jobs/{id}/bids" class="space-y-4"
            hx-post="/jobs/{id}/bids" hx-target="this" hx-swap="outerHTML" hx-disabled-elt="find button">
            {error}
            {amount}
            <label class="block space-y-1">
                <span class="text-sm font-medium">Proposal</span>
                <textarea name="proposal" rows="4" required class="w-full px-4 py-3 rounded-xl bg-surface"></textarea>
            </label>
            {button}
        </form>"#,
        id = attr(job_id),
        error = maybe_alert(Tone::Error, error),
        amount = field("Your price (USD)", "amount", "number", ""),
        button = submit_button("Place bid"),
    )
}

pub fn job_detail(role: Role, job: &Job, bids: Option<&[Bid]>) -> String {
    let mut body = format!(
        r#"{}<p class="text-sm text-textMuted">{}</p><p>{}</p>"#,
        heading(&job.title),
        esc(job.location.as_deref().unwrap_or("")),
        esc(job.description.as_deref().unwrap_or("")),
    );
    if let Some(bids) = bids {
        body.push_str(r#"<h2 class="font-semibold">Bids</h2>"#);
        body.push_str(&bid_rows(bids));
    }
    if role == Role::Engineer {
        body.push_str(r#"<h2 class="font-semibold">Send a proposal</h2>"#);
        body.push_str(&bid_form(&job.id, None));
    }
    card(&body)
}

pub fn new_job_form(values: Option<&NewJob>, error: Option<&str>) -> String {
    let (title, location, description, budget) = values.map_or_else(
        || (String::new(), String::new(), String::new(), String::new()),
        |v| {
            (
                v.title.clone(),
                v.location.clone(),
                v.description.clone(),
                v.budget.map(|b| b.to_string()).unwrap_or_default(),
            )
        },
    );
    format!(
        r#"<form id="job-form" method="post" action="/jobs/new" class="space-y-4"
            hx-post="/jobs/new" hx-target="this" hx-swap="outerHTML" hx-disabled-elt="find button">
            {error}
            {title}
            {location}
            <label class="block space-y-1">
                <span class="text-sm font-medium">Description</span>
                <textarea name="description" rows="5" required class="w-full px-4 py-3 rounded-xl bg-surface">{description}</textarea>
            </label>
            <label class="block space-y-1">
                <span class="text-sm font-medium">Budget (USD, optional)</span>
                <input name="budget" type="number" value="{budget}" class="w-full h-11 px-4 rounded-xl bg-surface">
            </label>
            {button}
        </form>"#,
        error = maybe_alert(Tone::Error, error),
        title = field("Title", "title", "text", &title),
        location = field("Location", "location", "text", &location),
        description = esc(&description),
        budget = attr(&budget),
        button = submit_button("Post job"),
    )
}

pub fn new_job_content(form: &str) -> String {
    card(&format!("{}{form}", heading("Post a job")))
}

pub fn admin_users(users: &[AdminUser]) -> String {
    let rows: String = users
        .iter()
        .map(|u| {
            format!(
                r#"<tr><td class="py-2">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                esc(u.name.as_deref().unwrap_or("")),
                esc(&u.email),
                esc(&u.user_type),
                match u.is_verified {
                    Some(true) => "yes",
                    Some(false) => "no",
                    None => "",
                }
            )
        })
        .collect();
    card(&format!(
        r#"{}<table class="w-full text-sm"><thead><tr class="text-left text-textMuted"><th>Name</th><th>Email</th><th>Type</th><th>Verified</th></tr></thead><tbody>{rows}</tbody></table>"#,
        heading("Users")
    ))
}

/// Profile view. The cached user record is display data; the role shown is
/// the one the token carries.
pub fn profile(user: Option<&CachedUser>, claims: &DecodedClaims) -> String {
    let row = |label: &str, value: &str| {
        format!(
            r#"<div class="flex justify-between py-2"><dt class="text-textMuted">{}</dt><dd>{}</dd></div>"#,
            esc(label),
            esc(value)
        )
    };
    let mut rows = vec![row("Account type", claims.role.label())];
    if let Some(user) = user {
        if let Some(name) = &user.name {
            rows.push(row("Name", name.as_str()));
        }
        if let Some(email) = &user.email {
            rows.push(row("Email", email.as_str()));
        }
    }
    let expires = claims.expires_at.format("%Y-%m-%d %H:%M UTC").to_string();
    rows.push(row("Session expires", expires.as_str()));
    card(&format!(
        r#"{}<dl class="divide-y divide-panelBorder">{}</dl>"#,
        heading("Profile"),
        rows.concat()
    ))
}
