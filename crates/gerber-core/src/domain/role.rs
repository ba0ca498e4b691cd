// ============================================================================
// Gerber Core - Role
// File: crates/gerber-core/src/domain/role.rs
// ============================================================================

use serde::{Deserialize, Serialize};

/// Account role. Serialized with its display name (`"Owner"`, `"Admin"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Admin,
    Manager,
    User,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Owner, Role::Admin, Role::Manager, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::User => "User",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Owner" => Some(Role::Owner),
            "Admin" => Some(Role::Admin),
            "Manager" => Some(Role::Manager),
            "User" => Some(Role::User),
            _ => None,
        }
    }

    /// Parse role claims, dropping names that are not roles.
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Vec<Role> {
        names.iter().filter_map(|n| Role::from_str(n.as_ref())).collect()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
