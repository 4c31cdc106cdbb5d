//! ConsoleKit Auth - authentication session and role capabilities for the
//! admin console
//!
//! - **auth**: roles, the role-to-capability table, user identity and the
//!   capability context resource stores consult before acting
//! - **session**: the session store that logs in, refreshes, resolves the
//!   current user and keeps persisted tokens consistent with its state
//!
//! Only super admins, admins, developers and analysts may hold a console
//! session. Any other role, including one this crate does not recognize, is
//! turned away at login and again when the current user is resolved.

pub mod auth;
pub mod session;

pub use auth::{
    Capability, CapabilityDomain, CapabilitySet, ConsoleContext, Credentials, Role,
    RoleParseError, UserProfile,
};
pub use session::{
    AuthFailureKind, AuthService, AuthServiceError, FileTokenStorage, MemoryTokenStorage,
    SessionPhase, SessionState, SessionStore, TokenKeys, TokenPair, TokenStorage,
    ACCESS_DENIED_MESSAGE,
};

use session::AuthServiceError as ServiceError;

/// Errors surfaced by session operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The service refused the credentials or token
    #[error("{message}")]
    Credential { message: String },

    /// The account authenticated but its role may not use the console
    #[error("{message}")]
    AccessDenied { message: String },

    /// The service could not be reached or failed
    #[error("{message}")]
    Transport { message: String },

    #[error("No refresh token available")]
    MissingToken,

    #[error("Missing capability: {capability}")]
    Forbidden { capability: Capability },
}

pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    /// Map a service failure, using `fallback` when the service gave no message
    pub fn from_service(error: &ServiceError, fallback: &str) -> Self {
        let message = error.message_or(fallback);
        match error.kind {
            AuthFailureKind::Rejected => Self::Credential { message },
            AuthFailureKind::Transport => Self::Transport { message },
        }
    }
}
