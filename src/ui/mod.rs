//! Server-rendered views.
//!
//! # Structure
//!
//! - [`navigation`]: redirects that work for plain and HTMX requests
//! - [`shell`]: page chrome and markup helpers
//! - [`pages`]: view bodies
//! - [`handlers`]: axum handlers wiring views to the auth flow and API

pub mod handlers;
pub mod navigation;
pub mod pages;
pub mod shell;
