//! Page chrome and small markup helpers.

use std::borrow::Cow;

use crate::auth::{Role, landing_for};

/// Escape text for an HTML text node.
pub fn esc(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

/// Escape text for a double-quoted attribute value.
pub fn attr(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

/// Alert banner tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Error,
    Success,
    Info,
}

/// An alert banner. `message` is escaped.
pub fn alert(tone: Tone, message: &str) -> String {
    let (class, role) = match tone {
        Tone::Error => ("bg-error/10 text-error", "alert"),
        Tone::Success => ("bg-success/10 text-success", "status"),
        Tone::Info => ("bg-surfaceVariant text-textSecondary", "status"),
    };
    format!(
        r#"<div class="rounded-xl px-4 py-3 text-sm {class}" role="{role}">{}</div>"#,
        esc(message)
    )
}

/// A labelled form input.
pub fn field(label: &str, name: &str, kind: &str, value: &str) -> String {
    format!(
        r#"<label class="block space-y-1">
            <span class="text-sm font-medium">{label}</span>
            <input name="{name}" type="{kind}" value="{value}" required
                class="w-full h-11 px-4 rounded-xl bg-surface text-textPrimary focus:outline-none focus:ring-2 focus:ring-primary">
        </label>"#,
        label = esc(label),
        name = attr(name),
        kind = attr(kind),
        value = attr(value),
    )
}

/// Submit button that HTMX disables while its request is in flight.
pub fn submit_button(label: &str) -> String {
    format!(
        r#"<button type="submit"
            class="w-full h-11 rounded-xl bg-primary text-white hover:bg-primaryMuted active:scale-95 font-medium transition-all disabled:opacity-50 disabled:cursor-not-allowed">
            <span class="htmx-indicator">Working…</span>
            <span>{}</span>
        </button>"#,
        esc(label)
    )
}

fn nav_links(signed_in: Option<Role>) -> String {
    let link = |href: &str, text: &str| {
        format!(
            r#"<a href="{href}" class="px-3 py-2 rounded-xl text-sm text-textSecondary hover:text-textPrimary hover:bg-surface transition-all">{text}</a>"#
        )
    };

    match signed_in {
        None => [link("/", "Home"), link("/login", "Log in"), link("/signup", "Sign up")].concat(),
        Some(role) => {
            let mut links = vec![link(landing_for(role).path(), "Dashboard")];
            match role {
                Role::Client => {
                    links.push(link("/jobs", "Jobs"));
                    links.push(link("/jobs/new", "Post a job"));
                }
                Role::Engineer => links.push(link("/jobs", "Find work")),
                Role::Admin => links.push(link("/admin/users", "Users")),
            }
            links.push(link("/profile", "Profile"));
            links.push(
                r#"<form method="post" action="/logout" hx-post="/logout" class="inline">
                    <button type="submit" class="px-3 py-2 rounded-xl text-sm text-textSecondary hover:text-textPrimary hover:bg-surface transition-all">Log out</button>
                </form>"#
                    .to_string(),
            );
            links.concat()
        }
    }
}

/// Generate the HTML shell for the application.
///
/// `content` is trusted markup; callers escape user data before building it.
pub fn html_shell(title: &str, signed_in: Option<Role>, content: &str) -> String {
    let title = esc(title);
    let nav = nav_links(signed_in);
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="RenewHire connects clients with renewable-energy engineers and technicians">
    <title>{title} - RenewHire</title>

    <!-- HTMX (local) -->
    <script src="/static/vendor/htmx-2.0.8.min.js"></script>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body class="min-h-screen bg-background text-textPrimary antialiased" hx-boost="true">
    <div id="app-shell" class="flex flex-col min-h-screen">
        <header class="sticky top-0 z-50 w-full bg-surfaceContainer backdrop-blur shadow-sm shrink-0">
            <div class="container mx-auto flex h-14 md:h-16 items-center justify-between px-4 md:px-6 max-w-5xl">
                <a href="/" class="flex items-center gap-2 md:gap-3 font-semibold hover:opacity-80 transition-opacity">
                    <svg class="h-5 w-5 md:h-6 md:w-6 text-primary" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">
                        <circle cx="12" cy="12" r="4"/>
                        <path d="M12 2v2M12 20v2M4.93 4.93l1.41 1.41M17.66 17.66l1.41 1.41M2 12h2M20 12h2M6.34 17.66l-1.41 1.41M19.07 4.93l-1.41 1.41"/>
                    </svg>
                    <span class="text-base md:text-lg">RenewHire</span>
                </a>
                <nav class="flex items-center gap-1">
                    {nav}
                </nav>
            </div>
        </header>

        <main id="app" class="flex-1 container mx-auto px-4 md:px-6 py-4 md:py-8 max-w-5xl">
            {content}
        </main>

        <footer class="bg-surfaceContainer py-3 md:py-6 shrink-0">
            <div class="container mx-auto px-4 md:px-6 max-w-5xl">
                <p class="text-xs text-textMuted text-center">
                    RenewHire: solar, wind and storage work, matched.
                </p>
            </div>
        </footer>
    </div>
</body>
</html>"#)
}
