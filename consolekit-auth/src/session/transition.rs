//! Session state transitions
//!
//! `reduce` decides the next state, the storage effect and the outcome for every
//! session event. It performs no I/O; [`SessionStore`](super::SessionStore) applies
//! the storage effect and commits the state.

use super::types::{LoginResponse, RefreshResponse, SessionState, TokenPair};
use crate::auth::UserProfile;
use crate::{SessionError, SessionResult};

/// Shown when an authenticated account's role may not use the console
pub const ACCESS_DENIED_MESSAGE: &str =
    "Access denied. This console is restricted to administrators, developers and analysts.";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";
pub const REFRESH_FAILED_MESSAGE: &str = "Token refresh failed";
pub const FETCH_USER_FAILED_MESSAGE: &str = "Failed to fetch current user";

/// Everything that can happen to a session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// An operation is about to call the authentication service
    Started,
    LoginSucceeded(LoginResponse),
    LoginFailed(SessionError),
    LoggedOut,
    RefreshSucceeded(RefreshResponse),
    RefreshFailed(SessionError),
    UserResolved(UserProfile),
    UserFetchFailed(SessionError),
    ErrorCleared,
    TornDown,
}

/// What must happen to persisted storage alongside a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEffect {
    Unchanged,
    Persist(TokenPair),
    Purge,
}

/// Result of reducing one event
#[derive(Debug)]
pub struct Transition {
    pub state: SessionState,
    pub storage: StorageEffect,
    pub outcome: SessionResult<()>,
}

impl Transition {
    fn ok(state: SessionState, storage: StorageEffect) -> Self {
        Self {
            state,
            storage,
            outcome: Ok(()),
        }
    }

    /// Reset to empty anonymous state carrying `error`, purging storage
    fn teardown_with(error: SessionError) -> Self {
        Self {
            state: SessionState {
                error: Some(error.to_string()),
                ..SessionState::empty()
            },
            storage: StorageEffect::Purge,
            outcome: Err(error),
        }
    }

    fn access_denied() -> Self {
        Self::teardown_with(SessionError::AccessDenied {
            message: ACCESS_DENIED_MESSAGE.to_string(),
        })
    }
}

/// Refresh token to send, read from state rather than storage
pub fn refresh_token_for(state: &SessionState) -> SessionResult<&str> {
    state
        .refresh_token
        .as_deref()
        .ok_or(SessionError::MissingToken)
}

/// Decide the next session state
pub fn reduce(current: &SessionState, event: SessionEvent) -> Transition {
    match event {
        SessionEvent::Started => Transition::ok(
            SessionState {
                is_loading: true,
                error: None,
                ..current.clone()
            },
            StorageEffect::Unchanged,
        ),

        SessionEvent::LoginSucceeded(response) => {
            if !response.user.has_console_access() {
                return Transition::access_denied();
            }
            let tokens = response.tokens;
            Transition::ok(
                SessionState {
                    user: Some(response.user),
                    access_token: Some(tokens.access_token.clone()),
                    refresh_token: Some(tokens.refresh_token.clone()),
                    is_authenticated: true,
                    is_loading: false,
                    error: None,
                },
                StorageEffect::Persist(tokens),
            )
        }

        SessionEvent::LoginFailed(error) | SessionEvent::RefreshFailed(error) => {
            Transition::teardown_with(error)
        }

        SessionEvent::LoggedOut | SessionEvent::TornDown => {
            Transition::ok(SessionState::empty(), StorageEffect::Purge)
        }

        SessionEvent::RefreshSucceeded(response) => {
            let refresh_token = match (response.refresh_token, &current.refresh_token) {
                (Some(rotated), _) => rotated,
                (None, Some(existing)) => existing.clone(),
                // Nothing to keep the session alive with afterwards
                (None, None) => {
                    return Transition::teardown_with(SessionError::MissingToken);
                }
            };
            let tokens = TokenPair::new(response.access_token, refresh_token);
            Transition::ok(
                SessionState {
                    user: current.user.clone(),
                    access_token: Some(tokens.access_token.clone()),
                    refresh_token: Some(tokens.refresh_token.clone()),
                    is_authenticated: true,
                    is_loading: false,
                    error: None,
                },
                StorageEffect::Persist(tokens),
            )
        }

        SessionEvent::UserResolved(user) => {
            if !user.has_console_access() {
                return Transition::access_denied();
            }
            Transition::ok(
                SessionState {
                    user: Some(user),
                    is_authenticated: true,
                    is_loading: false,
                    error: None,
                    ..current.clone()
                },
                StorageEffect::Unchanged,
            )
        }

        // Tokens stay put here, unlike a failed refresh
        SessionEvent::UserFetchFailed(error) => Transition {
            state: SessionState {
                is_authenticated: false,
                is_loading: false,
                error: Some(error.to_string()),
                ..current.clone()
            },
            storage: StorageEffect::Unchanged,
            outcome: Err(error),
        },

        SessionEvent::ErrorCleared => Transition::ok(
            SessionState {
                error: None,
                ..current.clone()
            },
            StorageEffect::Unchanged,
        ),
    }
}
