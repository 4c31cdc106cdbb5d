//! Session Types and Structures
//!
//! State held by the session store and the payloads exchanged with the
//! authentication service.

use crate::auth::{ConsoleContext, Role, UserProfile};
use serde::{Deserialize, Serialize};

/// Access and refresh token, always stored and purged together
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Successful login payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: UserProfile,
}

impl LoginResponse {
    pub fn new(tokens: TokenPair, user: UserProfile) -> Self {
        Self {
            tokens,
            token_type: Some("bearer".to_string()),
            expires_in: None,
            user,
        }
    }
}

/// Successful refresh payload
///
/// The server may rotate the refresh token or leave it out, in which case the
/// current one stays valid.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl RefreshResponse {
    pub fn rotated(tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: Some(tokens.refresh_token),
            expires_in: None,
        }
    }

    pub fn access_only(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_in: None,
        }
    }
}

impl std::fmt::Debug for RefreshResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshResponse")
            .field("access_token", &"<redacted>")
            .field("rotated", &self.refresh_token.is_some())
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Coarse lifecycle phase derived from [`SessionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Anonymous => write!(f, "anonymous"),
            SessionPhase::Authenticating => write!(f, "authenticating"),
            SessionPhase::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// The authenticated actor in this client
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    /// Last failure message, kept until cleared or superseded
    pub error: Option<String>,
}

impl SessionState {
    /// Empty anonymous state
    pub fn empty() -> Self {
        Self::default()
    }

    /// State restored from persisted tokens; the user is resolved later
    pub fn hydrated(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            is_authenticated: access_token.is_some(),
            access_token,
            refresh_token,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Authenticating
        } else if self.is_authenticated {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().and_then(UserProfile::assigned_role)
    }

    pub fn has_tokens(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }

    /// Capability view for resource stores
    pub fn context(&self) -> ConsoleContext {
        ConsoleContext::from_state(self)
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("user", &self.user.as_ref().map(|u| &u.username))
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("is_authenticated", &self.is_authenticated)
            .field("is_loading", &self.is_loading)
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hydrated_state_is_authenticated_only_with_access_token() {
        let state = SessionState::hydrated(Some("a".into()), Some("r".into()));
        assert!(state.is_authenticated);
        assert_eq!(state.phase(), SessionPhase::Authenticated);
        assert!(state.user.is_none());

        let refresh_only = SessionState::hydrated(None, Some("r".into()));
        assert!(!refresh_only.is_authenticated);
        assert_eq!(refresh_only.phase(), SessionPhase::Anonymous);
        assert!(refresh_only.has_tokens());
    }

    #[test]
    fn loading_wins_over_authenticated() {
        let state = SessionState {
            is_loading: true,
            ..SessionState::hydrated(Some("a".into()), None)
        };
        assert_eq!(state.phase(), SessionPhase::Authenticating);
    }

    #[test]
    fn debug_output_never_contains_tokens() {
        let state = SessionState::hydrated(Some("secret-access".into()), Some("secret-refresh".into()));
        let rendered = format!("{:?}", state);
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));

        let pair = TokenPair::new("secret-access", "secret-refresh");
        assert!(!format!("{:?}", pair).contains("secret"));
    }

    #[test]
    fn login_response_reads_flat_token_fields() {
        let response: LoginResponse = serde_json::from_str(
            r#"{
                "access_token": "a1",
                "refresh_token": "r1",
                "token_type": "bearer",
                "expires_in": 1800,
                "user": {"id": "7", "username": "dev", "role": "developer"}
            }"#,
        )
        .unwrap();

        assert_eq!(response.tokens, TokenPair::new("a1", "r1"));
        assert_eq!(response.expires_in, Some(1800));
        assert_eq!(response.user.assigned_role(), Some(Role::Developer));
    }

    #[test]
    fn refresh_response_without_rotation() {
        let response: RefreshResponse =
            serde_json::from_str(r#"{"access_token": "a2", "token_type": "bearer"}"#).unwrap();
        assert_eq!(response.access_token, "a2");
        assert!(response.refresh_token.is_none());
    }
}
