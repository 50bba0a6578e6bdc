//! Post-login dispatch to the role's landing view.

use super::role::{Role, UnknownRole};

/// Landing view for a freshly signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    ClientDashboard,
    EngineerDashboard,
    AdminDashboard,
}

impl Landing {
    pub fn path(self) -> &'static str {
        match self {
            Landing::ClientDashboard => "/client/dashboard",
            Landing::EngineerDashboard => "/engineer/dashboard",
            Landing::AdminDashboard => "/admin/dashboard",
        }
    }
}

/// Landing view for `role`. Adding a role means adding an arm here.
pub fn landing_for(role: Role) -> Landing {
    match role {
        Role::Client => Landing::ClientDashboard,
        Role::Engineer => Landing::EngineerDashboard,
        Role::Admin => Landing::AdminDashboard,
    }
}

/// Resolve the role string carried by a login response.
pub fn route_login(user_type: &str) -> Result<Landing, UnknownRole> {
    user_type.parse::<Role>().map(landing_for)
}
