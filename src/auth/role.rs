//! Marketplace account roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account type of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Posts jobs and accepts bids.
    Client,
    /// Browses jobs and places bids.
    Engineer,
    /// Operates the marketplace.
    Admin,
}

/// A role string outside the declared role set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown account type `{0}`")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::Client, Role::Engineer, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Engineer => "engineer",
            Role::Admin => "admin",
        }
    }

    /// Human label for navigation and headings.
    pub fn label(self) -> &'static str {
        match self {
            Role::Client => "Client",
            Role::Engineer => "Engineer",
            Role::Admin => "Admin",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "engineer" => Ok(Role::Engineer),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
