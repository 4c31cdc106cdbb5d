//! Roles, capabilities and identity
//!
//! - [`role`]: the closed set of roles the server assigns
//! - [`permissions`]: the static role-to-capability table and derived checks
//! - [`identity`]: user profiles and login credentials
//! - [`context`]: capability view of a session for resource stores

pub mod context;
pub mod identity;
pub mod permissions;
pub mod role;

pub use context::ConsoleContext;
pub use identity::{Credentials, UserProfile};
pub use permissions::{
    can_modify_api_keys, can_modify_documents, can_modify_users, has_capability,
    has_capability_named, has_console_access, is_elevated_role, is_view_only_role,
    permissions_for, permissions_for_name, Capability, CapabilityDomain, CapabilitySet,
    CONSOLE_ACCESS_ROLES, FAIL_CLOSED_ROLE,
};
pub use role::{Role, RoleParseError};
