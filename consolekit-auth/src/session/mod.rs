//! Session Management Module
//!
//! Owns the authenticated actor of a console client: tokens, the resolved
//! user, and the lifecycle that keeps persisted tokens in step with state.

pub mod service;
pub mod storage;
pub mod store;
pub mod transition;
pub mod types;

pub use service::{AuthFailureKind, AuthService, AuthServiceError};
pub use storage::{
    storage_from_config, FileTokenStorage, MemoryTokenStorage, TokenKeys, TokenStorage,
};
pub use store::SessionStore;
pub use transition::{
    reduce, SessionEvent, StorageEffect, Transition, ACCESS_DENIED_MESSAGE,
    FETCH_USER_FAILED_MESSAGE, LOGIN_FAILED_MESSAGE, REFRESH_FAILED_MESSAGE,
};
pub use types::*;
