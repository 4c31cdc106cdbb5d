//! Authentication Service
//!
//! The external service the session store talks to. Transport is up to the
//! implementor; the store only sees these outcomes.

use super::types::{LoginResponse, RefreshResponse};
use crate::auth::{Credentials, UserProfile};
use async_trait::async_trait;

/// Why an authentication call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailureKind {
    /// The service answered and refused (bad credentials, expired token)
    #[error("rejected")]
    Rejected,
    /// The service could not be reached or failed internally
    #[error("transport failure")]
    Transport,
}

/// Failure reported by an [`AuthService`], with an optional human readable message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}{}", detail(.message))]
pub struct AuthServiceError {
    pub kind: AuthFailureKind,
    pub message: Option<String>,
}

impl AuthServiceError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: AuthFailureKind::Rejected,
            message: Some(message.into()),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: AuthFailureKind::Transport,
            message: Some(message.into()),
        }
    }

    /// Failure without any message from the service
    pub fn bare(kind: AuthFailureKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Service message if present and non-blank, otherwise `fallback`
    pub fn message_or(&self, fallback: &str) -> String {
        match self.message.as_deref() {
            Some(message) if !message.trim().is_empty() => message.to_string(),
            _ => fallback.to_string(),
        }
    }
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {}", message))
        .unwrap_or_default()
}

/// Authentication service consumed by the session store
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for tokens and the account identity
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthServiceError>;

    /// Invalidate the server-side session
    async fn logout(&self, access_token: Option<&str>) -> Result<(), AuthServiceError>;

    /// Obtain a new access token (and possibly a new refresh token)
    async fn refresh_token(&self, refresh_token: &str)
        -> Result<RefreshResponse, AuthServiceError>;

    /// Resolve the identity behind an access token
    async fn get_current_user(
        &self,
        access_token: Option<&str>,
    ) -> Result<UserProfile, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_or_prefers_service_text() {
        let err = AuthServiceError::rejected("Invalid username or password");
        assert_eq!(err.message_or("Login failed"), "Invalid username or password");
    }

    #[test]
    fn message_or_falls_back_on_missing_or_blank() {
        assert_eq!(
            AuthServiceError::bare(AuthFailureKind::Transport).message_or("Login failed"),
            "Login failed"
        );
        assert_eq!(
            AuthServiceError::rejected("   ").message_or("Login failed"),
            "Login failed"
        );
    }

    #[test]
    fn is_a_std_error() {
        let err: Box<dyn std::error::Error + Send + Sync> =
            Box::new(AuthServiceError::rejected("Invalid refresh token"));
        assert_eq!(err.to_string(), "rejected: Invalid refresh token");
        assert_eq!(AuthFailureKind::Transport.to_string(), "transport failure");
    }

    #[test]
    fn display_includes_kind() {
        assert_eq!(
            AuthServiceError::transport("connection refused").to_string(),
            "transport failure: connection refused"
        );
        assert_eq!(
            AuthServiceError::bare(AuthFailureKind::Rejected).to_string(),
            "rejected"
        );
    }
}
