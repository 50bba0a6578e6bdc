//! Client-side authentication gate and role-based routing.
//!
//! This module decides, without asking the backend, whether the stored
//! session may see a view and where a freshly signed-in user lands. The
//! backend still re-checks the bearer token on every API call; the gate
//! only saves round-trips and keeps protected markup from rendering.
//!
//! # Architecture
//!
//! - [`token`]: decode role and identity claims from the bearer token
//! - [`guard`]: per-navigation grant/deny state machine over a [`RoutePolicy`]
//! - [`router`]: total mapping from role to landing view
//! - [`login`]: single-flight sign-in that persists the session
//! - [`middleware`]: Axum layer applying the guard to a route group

pub mod error;
pub mod guard;
pub mod login;
pub mod middleware;
pub mod role;
pub mod router;
pub mod token;

pub use error::{AuthError, UNKNOWN_ROLE_MESSAGE};
pub use guard::{AccessGuard, DenyReason, GuardDecision, RoutePolicy};
pub use login::LoginFlow;
pub use role::{Role, UnknownRole};
pub use router::{Landing, landing_for, route_login};
pub use token::{DecodedClaims, InvalidToken, decode};
