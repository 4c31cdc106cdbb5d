//! Role Registry
//!
//! The closed set of roles the authentication server can assign to an account.

use serde::{Deserialize, Serialize};

/// Role assigned to an account by the authentication server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Developer,
    Analyst,
    User,
    #[serde(rename = "readonly")]
    ReadOnly,
}

impl Role {
    /// Every role, most privileged first
    pub const ALL: [Role; 6] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Developer,
        Role::Analyst,
        Role::User,
        Role::ReadOnly,
    ];

    /// Name used on the wire by the authentication server
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Developer => "developer",
            Role::Analyst => "analyst",
            Role::User => "user",
            Role::ReadOnly => "readonly",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a role string matches none of the known roles
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct RoleParseError(pub String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    /// Accepts the wire names, the variant names in any ASCII case
    /// (`SuperAdmin`, `SUPER_ADMIN`, `read_only`), and either behind the
    /// `UserRole.` prefix some server token claims carry. Anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.strip_prefix("UserRole.").unwrap_or(s);

        ROLE_SPELLINGS
            .iter()
            .find(|(spelling, _)| bare.eq_ignore_ascii_case(spelling))
            .map(|(_, role)| *role)
            .ok_or_else(|| RoleParseError(s.to_string()))
    }
}

const ROLE_SPELLINGS: [(&str, Role); 8] = [
    ("super_admin", Role::SuperAdmin),
    ("superadmin", Role::SuperAdmin),
    ("admin", Role::Admin),
    ("developer", Role::Developer),
    ("analyst", Role::Analyst),
    ("user", Role::User),
    ("readonly", Role::ReadOnly),
    ("read_only", Role::ReadOnly),
];
