use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::auth::middleware::{RouteGate, require_role};
use crate::auth::{Role, RoutePolicy};
use crate::config::AppConfig;
use crate::ui::handlers;

/// Wrap a route group so it only renders for `policy`.
fn guarded(state: &AppState, policy: RoutePolicy, routes: Router<AppState>) -> Router<AppState> {
    let gate = RouteGate::new(state.guard.clone(), policy);
    routes.route_layer(from_fn_with_state(gate, require_role))
}

/// Assemble the full router.
///
/// Public views are open. Every other view belongs to exactly one guarded
/// group, and the group's policy names the roles that may render it.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::home))
        .route(
            "/login",
            get(handlers::login_page).post(handlers::login_submit),
        )
        .route("/logout", post(handlers::logout))
        .route(
            "/signup",
            get(handlers::signup_page).post(handlers::signup_submit),
        )
        .route("/verify-email", get(handlers::verify_email))
        .route(
            "/forgot-password",
            get(handlers::forgot_password_page).post(handlers::forgot_password_submit),
        )
        .route(
            "/reset-password",
            get(handlers::reset_password_page).post(handlers::reset_password_submit),
        );

    let client = guarded(
        &state,
        RoutePolicy::allow([Role::Client]),
        Router::new()
            .route("/client/dashboard", get(handlers::client_dashboard))
            .route(
                "/jobs/new",
                get(handlers::new_job_page).post(handlers::new_job_submit),
            ),
    );

    let engineer = guarded(
        &state,
        RoutePolicy::allow([Role::Engineer]),
        Router::new()
            .route("/engineer/dashboard", get(handlers::engineer_dashboard))
            .route("/jobs/{id}/bids", post(handlers::place_bid)),
    );

    let admin = guarded(
        &state,
        RoutePolicy::allow([Role::Admin]),
        Router::new()
            .route("/admin/dashboard", get(handlers::admin_dashboard))
            .route("/admin/users", get(handlers::admin_users)),
    );

    let marketplace = guarded(
        &state,
        RoutePolicy::allow([Role::Client, Role::Engineer]),
        Router::new()
            .route("/jobs", get(handlers::jobs_board))
            .route("/jobs/{id}", get(handlers::job_detail)),
    );

    let account = guarded(
        &state,
        RoutePolicy::any_role(),
        Router::new().route("/profile", get(handlers::profile)),
    );

    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        .merge(public)
        .merge(client)
        .merge(engineer)
        .merge(admin)
        .merge(marketplace)
        .merge(account)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    info!(
        name: "api.config.loaded",
        base_url = %config.api.base_url,
        timeout_secs = config.api.timeout_secs,
        session_storage = ?config.session.storage,
        "API configuration loaded"
    );

    let state = AppState::from_config(Arc::clone(&config))?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
