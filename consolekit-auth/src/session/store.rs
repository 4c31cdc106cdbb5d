//! Session Store - the single owner of authentication state
//!
//! Every operation calls the authentication service, feeds the outcome through
//! [`reduce`](super::transition::reduce) and commits the result. Storage effects
//! are applied while the state lock is held, so observers never see the stored
//! token pair disagree with the published state.

use super::service::AuthService;
use super::storage::{storage_from_config, TokenKeys, TokenStorage};
use super::transition::{self, SessionEvent, StorageEffect};
use super::types::{SessionPhase, SessionState};
use crate::auth::{ConsoleContext, Credentials, UserProfile};
use crate::{SessionError, SessionResult};
use consolekit_core::logging::performance::measure_async;
use consolekit_core::{ConsoleConfig, ConsoleResult};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Authentication session for one console client
pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    storage: Arc<dyn TokenStorage>,
    keys: TokenKeys,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Create a store, restoring whatever tokens are persisted
    ///
    /// A storage read failure starts the session anonymous rather than failing.
    pub fn hydrate(
        auth: Arc<dyn AuthService>,
        storage: Arc<dyn TokenStorage>,
        keys: TokenKeys,
    ) -> Self {
        let initial = match keys.load(storage.as_ref()) {
            Ok((access_token, refresh_token)) => {
                SessionState::hydrated(access_token, refresh_token)
            }
            Err(e) => {
                e.log();
                warn!("Could not read persisted session tokens, starting anonymous");
                SessionState::empty()
            }
        };

        info!(phase = %initial.phase(), "Session store initialized");
        let (state, _) = watch::channel(initial);

        Self {
            auth,
            storage,
            keys,
            state,
        }
    }

    /// Create a store with storage and key names taken from configuration
    pub fn from_config(auth: Arc<dyn AuthService>, config: &ConsoleConfig) -> ConsoleResult<Self> {
        config.validate()?;
        let storage = storage_from_config(&config.storage)?;
        Ok(Self::hydrate(auth, storage, TokenKeys::from(&config.session)))
    }

    /// Current state
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every committed transition
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    /// Capability view of the current session
    pub fn context(&self) -> ConsoleContext {
        self.state.borrow().context()
    }

    /// Log in and, if the account may use the console, persist its tokens
    pub async fn login(&self, credentials: &Credentials) -> SessionResult<UserProfile> {
        info!(username = %credentials.username, "Logging in");
        self.dispatch(SessionEvent::Started)?;

        match measure_async("session.login", self.auth.login(credentials)).await {
            Ok(response) => {
                let user = response.user.clone();
                self.dispatch(SessionEvent::LoginSucceeded(response))
                    .inspect_err(|_| {
                        warn!(username = %user.username, role = %user.role, "Console access denied")
                    })?;
                info!(user = %user.display_string(), "Logged in");
                Ok(user)
            }
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Login failed");
                let error = SessionError::from_service(&e, transition::LOGIN_FAILED_MESSAGE);
                let _ = self.dispatch(SessionEvent::LoginFailed(error.clone()));
                Err(error)
            }
        }
    }

    /// End the session; local state is cleared even when the service call fails
    pub async fn logout(&self) -> SessionResult<()> {
        let access_token = self.state.borrow().access_token.clone();
        let _ = self.dispatch(SessionEvent::Started);

        if let Err(e) = measure_async(
            "session.logout",
            self.auth.logout(access_token.as_deref()),
        )
        .await
        {
            warn!(error = %e, "Logout request failed, clearing local session anyway");
        }

        self.dispatch(SessionEvent::LoggedOut)?;
        info!("Logged out");
        Ok(())
    }

    /// Exchange the current refresh token for a new access token
    ///
    /// Fails with [`MissingToken`](crate::SessionError::MissingToken) without
    /// calling the service or touching state when no refresh token is held.
    pub async fn refresh_token(&self) -> SessionResult<()> {
        let refresh_token = transition::refresh_token_for(&self.state.borrow())?.to_string();
        self.dispatch(SessionEvent::Started)?;

        match measure_async(
            "session.refresh_token",
            self.auth.refresh_token(&refresh_token),
        )
        .await
        {
            Ok(response) => {
                debug!(rotated = response.refresh_token.is_some(), "Access token refreshed");
                self.dispatch(SessionEvent::RefreshSucceeded(response))
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                let error = SessionError::from_service(&e, transition::REFRESH_FAILED_MESSAGE);
                self.dispatch(SessionEvent::RefreshFailed(error))
            }
        }
    }

    /// Resolve the user behind the current access token
    pub async fn get_current_user(&self) -> SessionResult<UserProfile> {
        let access_token = self.state.borrow().access_token.clone();
        self.dispatch(SessionEvent::Started)?;

        match measure_async(
            "session.get_current_user",
            self.auth.get_current_user(access_token.as_deref()),
        )
        .await
        {
            Ok(user) => {
                let resolved = user.clone();
                self.dispatch(SessionEvent::UserResolved(user))
                    .inspect_err(|_| {
                        warn!(username = %resolved.username, role = %resolved.role, "Console access denied")
                    })?;
                debug!(username = %resolved.username, "Current user resolved");
                Ok(resolved)
            }
            Err(e) => {
                warn!(error = %e, "Could not fetch current user");
                let error = SessionError::from_service(&e, transition::FETCH_USER_FAILED_MESSAGE);
                let _ = self.dispatch(SessionEvent::UserFetchFailed(error.clone()));
                Err(error)
            }
        }
    }

    pub fn clear_error(&self) {
        let _ = self.dispatch(SessionEvent::ErrorCleared);
    }

    /// Forget the session locally without contacting the service
    pub fn teardown(&self) {
        let _ = self.dispatch(SessionEvent::TornDown);
        debug!("Session torn down");
    }

    /// Reduce `event`, apply its storage effect and publish the new state
    fn dispatch(&self, event: SessionEvent) -> SessionResult<()> {
        let mut outcome = Ok(());
        self.state.send_modify(|state| {
            let next = transition::reduce(state, event);
            self.apply(&next.storage);
            *state = next.state;
            outcome = next.outcome;
        });
        outcome
    }

    fn apply(&self, effect: &StorageEffect) {
        let result = match effect {
            StorageEffect::Unchanged => return,
            StorageEffect::Persist(tokens) => self.keys.persist(self.storage.as_ref(), tokens),
            StorageEffect::Purge => self.keys.purge(self.storage.as_ref()),
        };

        if let Err(e) = result {
            e.log();
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("keys", &self.keys)
            .field("state", &*self.state.borrow())
            .finish()
    }
}
