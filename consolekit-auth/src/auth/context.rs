//! Console Context
//!
//! Authorization view of a session that resource stores (users, documents, API keys,
//! settings) consult before issuing their own calls.

use super::identity::UserProfile;
use super::permissions::{self, Capability, CapabilitySet, FAIL_CLOSED_ROLE};
use super::role::Role;
use crate::session::SessionState;
use crate::{SessionError, SessionResult};

/// Capability context derived from the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleContext {
    /// Resolved identity, absent before `get_current_user` completes
    pub user: Option<UserProfile>,
    /// Whether the session currently counts as authenticated
    pub is_authenticated: bool,
}

impl ConsoleContext {
    /// Context for a signed-out client; every capability check fails
    pub fn anonymous() -> Self {
        Self {
            user: None,
            is_authenticated: false,
        }
    }

    /// Context for an authenticated user
    pub fn for_user(user: UserProfile) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
        }
    }

    /// Build a context from a session snapshot
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            user: state.user.clone(),
            is_authenticated: state.is_authenticated,
        }
    }

    /// Role in effect, `None` when the identity is unresolved or unrecognized
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().and_then(UserProfile::assigned_role)
    }

    /// Capabilities in effect; unauthenticated contexts have none
    pub fn capabilities(&self) -> Option<&'static CapabilitySet> {
        if !self.is_authenticated {
            return None;
        }
        Some(permissions::permissions_for(
            self.role().unwrap_or(FAIL_CLOSED_ROLE),
        ))
    }

    /// Check if this context has a specific capability
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities()
            .map(|set| set.get(capability))
            .unwrap_or(false)
    }

    pub fn can_all(&self, capabilities: &[Capability]) -> bool {
        capabilities.iter().all(|c| self.can(*c))
    }

    pub fn can_any(&self, capabilities: &[Capability]) -> bool {
        capabilities.iter().any(|c| self.can(*c))
    }

    /// Fail with [`SessionError::Forbidden`] unless the capability is granted
    pub fn require(&self, capability: Capability) -> SessionResult<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(SessionError::Forbidden { capability })
        }
    }

    pub fn can_modify_users(&self) -> bool {
        self.capabilities()
            .map(CapabilitySet::can_modify_users)
            .unwrap_or(false)
    }

    pub fn can_modify_documents(&self) -> bool {
        self.capabilities()
            .map(CapabilitySet::can_modify_documents)
            .unwrap_or(false)
    }

    pub fn can_modify_api_keys(&self) -> bool {
        self.capabilities()
            .map(CapabilitySet::can_modify_api_keys)
            .unwrap_or(false)
    }

    pub fn is_view_only(&self) -> bool {
        self.role().map(permissions::is_view_only_role).unwrap_or(false)
    }

    pub fn is_elevated(&self) -> bool {
        self.is_authenticated && self.role().map(permissions::is_elevated_role).unwrap_or(false)
    }

    /// Create a summary string for logging
    pub fn summary(&self) -> String {
        let user_info = match &self.user {
            Some(user) => format!("{}({})", user.username, user.role),
            None if self.is_authenticated => "unresolved".to_string(),
            None => "anonymous".to_string(),
        };

        let granted = self.capabilities().map(|set| set.granted().count()).unwrap_or(0);

        format!(
            "ConsoleContext[user={}, authenticated={}, capabilities={}]",
            user_info, self.is_authenticated, granted
        )
    }
}

impl Default for ConsoleContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
