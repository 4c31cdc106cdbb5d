//! User Identity
//!
//! Identity records returned by the authentication server and the credentials used
//! to obtain them.

use super::permissions::{self, CapabilitySet};
use super::role::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Username/password pair submitted at login
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account identity as reported by the authentication server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Role exactly as delivered; see [`UserProfile::assigned_role`]
    pub role: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl UserProfile {
    /// Minimal profile, mostly useful for tests and fixtures
    pub fn new(id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: String::new(),
            full_name: None,
            role: role.as_str().to_string(),
            is_active: true,
            is_verified: false,
            created_at: None,
            last_login: None,
        }
    }

    /// Replace the raw role string, including values no [`Role`] matches
    pub fn with_raw_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Parsed role, `None` when the server sent something unrecognized
    pub fn assigned_role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    /// Whether this account may use the console; unrecognized roles may not
    pub fn has_console_access(&self) -> bool {
        self.assigned_role()
            .map(permissions::has_console_access)
            .unwrap_or(false)
    }

    /// Capabilities for this account, failing closed on unrecognized roles
    pub fn capabilities(&self) -> &'static CapabilitySet {
        permissions::permissions_for_name(&self.role)
    }

    /// Get user display string
    pub fn display_string(&self) -> String {
        match &self.full_name {
            Some(name) => format!("{} ({})", name, self.role),
            None => format!("{} ({})", self.username, self.role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials::new("alice", "hunter2");
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn deserializes_server_payload() {
        let profile: UserProfile = serde_json::from_str(
            r#"{
                "id": "u-1",
                "username": "alice",
                "email": "alice@example.com",
                "full_name": "Alice Liddell",
                "role": "UserRole.ADMIN",
                "is_active": true,
                "is_verified": true,
                "created_at": "2024-01-02T03:04:05Z",
                "last_login": null
            }"#,
        )
        .unwrap();

        assert_eq!(profile.assigned_role(), Some(Role::Admin));
        assert!(profile.has_console_access());
        assert_eq!(profile.display_string(), "Alice Liddell (UserRole.ADMIN)");
        assert!(profile.created_at.is_some());
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"id": "u-2", "username": "bob", "role": "analyst"}"#)
                .unwrap();
        assert!(profile.is_active);
        assert!(!profile.is_verified);
        assert_eq!(profile.email, "");
    }

    #[test]
    fn unrecognized_role_is_denied_and_fails_closed() {
        let profile = UserProfile::new("u-3", "mallory", Role::Admin).with_raw_role("owner");
        assert_eq!(profile.assigned_role(), None);
        assert!(!profile.has_console_access());
        assert_eq!(
            profile.capabilities(),
            permissions::permissions_for(Role::User)
        );
    }
}
