//! RenewHire portal
//!
//! Local web front end for the RenewHire job marketplace. It signs users in
//! against the marketplace API, keeps the issued bearer token in a session
//! slot, and gates every role-specific view on the claims inside that token.
//!
//! # Architecture
//!
//! - **Server**: Axum router rendering HTML pages, enhanced with HTMX
//! - **Auth**: token decoding, access guard, role routing and login flow
//! - **API**: bearer-attaching client for the marketplace backend
//! - **Session**: injectable storage for the token and cached user record
//!
//! # Modules
//!
//! - [`api`]: API gateway client and wire types
//! - [`auth`]: token decoder, access guard, role router, login flow
//! - [`config`]: layered configuration
//! - [`server`]: router assembly and server startup
//! - [`session`]: session storage backends
//! - [`ui`]: views and handlers

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod auth;
pub mod config;
pub mod server;
pub mod session;
pub mod ui;

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::auth::{AccessGuard, LoginFlow};
use crate::config::{AppConfig, SessionBackend};
use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Global configuration.
    pub config: Arc<AppConfig>,
    /// The single session slot. Everything below reads from this one store.
    pub sessions: Arc<dyn SessionStore>,
    /// Marketplace API client.
    pub api: ApiClient,
    /// Guard consulted by every protected route group.
    pub guard: AccessGuard,
    /// Sign-in flow with its in-flight lock.
    pub login: Arc<LoginFlow>,
}

impl AppState {
    /// Build state with the session backend selected in `config`.
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self, ApiError> {
        let sessions: Arc<dyn SessionStore> = match config.session.storage {
            SessionBackend::File => Arc::new(FileSessionStore::new(&config.session.path)),
            SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
        };
        Self::with_store(config, sessions)
    }

    /// Build state around an existing session store.
    pub fn with_store(
        config: Arc<AppConfig>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(
            &config.api.base_url,
            config.api.timeout(),
            Arc::clone(&sessions),
        )?;
        let guard = AccessGuard::new(Arc::clone(&sessions));
        let login = Arc::new(LoginFlow::new(api.clone(), Arc::clone(&sessions)));
        Ok(Self {
            config,
            sessions,
            api,
            guard,
            login,
        })
    }
}
