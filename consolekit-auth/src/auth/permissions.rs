//! Permission Table
//!
//! Static role-to-capability mapping for the admin console. Every capability is an
//! explicit literal for every role, so adding a role or a capability is a data edit.
//!
//! These checks gate what the console lets a user *attempt*. The server remains the
//! authority on what is actually allowed.

use super::role::Role;
use serde::{Deserialize, Serialize};

/// Role used when a role value is missing or unrecognized
pub const FAIL_CLOSED_ROLE: Role = Role::User;

/// Roles allowed to use the console at all
pub const CONSOLE_ACCESS_ROLES: [Role; 4] =
    [Role::SuperAdmin, Role::Admin, Role::Analyst, Role::Developer];

/// Functional area a capability belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityDomain {
    UserManagement,
    Documents,
    ApiKeys,
    SecurityEvents,
    Analytics,
    Settings,
    System,
}

/// A single capability flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewUsers,
    CreateUsers,
    EditUsers,
    DeleteUsers,
    ManageRoles,
    ViewDocuments,
    UploadDocuments,
    DeleteDocuments,
    BulkImportDocuments,
    ViewApiKeys,
    CreateApiKeys,
    DeleteApiKeys,
    ViewSecurityEvents,
    ResolveSecurityEvents,
    ViewDashboard,
    ViewAnalytics,
    ExportAnalytics,
    ViewSettings,
    EditSettings,
    ViewSystemHealth,
    ViewLogs,
    ClearCache,
    ManageSystem,
}

impl Capability {
    /// Every declared capability, grouped by domain
    pub const ALL: [Capability; 23] = [
        Capability::ViewUsers,
        Capability::CreateUsers,
        Capability::EditUsers,
        Capability::DeleteUsers,
        Capability::ManageRoles,
        Capability::ViewDocuments,
        Capability::UploadDocuments,
        Capability::DeleteDocuments,
        Capability::BulkImportDocuments,
        Capability::ViewApiKeys,
        Capability::CreateApiKeys,
        Capability::DeleteApiKeys,
        Capability::ViewSecurityEvents,
        Capability::ResolveSecurityEvents,
        Capability::ViewDashboard,
        Capability::ViewAnalytics,
        Capability::ExportAnalytics,
        Capability::ViewSettings,
        Capability::EditSettings,
        Capability::ViewSystemHealth,
        Capability::ViewLogs,
        Capability::ClearCache,
        Capability::ManageSystem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewUsers => "view_users",
            Capability::CreateUsers => "create_users",
            Capability::EditUsers => "edit_users",
            Capability::DeleteUsers => "delete_users",
            Capability::ManageRoles => "manage_roles",
            Capability::ViewDocuments => "view_documents",
            Capability::UploadDocuments => "upload_documents",
            Capability::DeleteDocuments => "delete_documents",
            Capability::BulkImportDocuments => "bulk_import_documents",
            Capability::ViewApiKeys => "view_api_keys",
            Capability::CreateApiKeys => "create_api_keys",
            Capability::DeleteApiKeys => "delete_api_keys",
            Capability::ViewSecurityEvents => "view_security_events",
            Capability::ResolveSecurityEvents => "resolve_security_events",
            Capability::ViewDashboard => "view_dashboard",
            Capability::ViewAnalytics => "view_analytics",
            Capability::ExportAnalytics => "export_analytics",
            Capability::ViewSettings => "view_settings",
            Capability::EditSettings => "edit_settings",
            Capability::ViewSystemHealth => "view_system_health",
            Capability::ViewLogs => "view_logs",
            Capability::ClearCache => "clear_cache",
            Capability::ManageSystem => "manage_system",
        }
    }

    pub fn domain(&self) -> CapabilityDomain {
        match self {
            Capability::ViewUsers
            | Capability::CreateUsers
            | Capability::EditUsers
            | Capability::DeleteUsers
            | Capability::ManageRoles => CapabilityDomain::UserManagement,
            Capability::ViewDocuments
            | Capability::UploadDocuments
            | Capability::DeleteDocuments
            | Capability::BulkImportDocuments => CapabilityDomain::Documents,
            Capability::ViewApiKeys | Capability::CreateApiKeys | Capability::DeleteApiKeys => {
                CapabilityDomain::ApiKeys
            }
            Capability::ViewSecurityEvents | Capability::ResolveSecurityEvents => {
                CapabilityDomain::SecurityEvents
            }
            Capability::ViewDashboard | Capability::ViewAnalytics | Capability::ExportAnalytics => {
                CapabilityDomain::Analytics
            }
            Capability::ViewSettings | Capability::EditSettings => CapabilityDomain::Settings,
            Capability::ViewSystemHealth
            | Capability::ViewLogs
            | Capability::ClearCache
            | Capability::ManageSystem => CapabilityDomain::System,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|capability| capability.as_str() == s)
            .ok_or_else(|| format!("Unknown capability: {}", s))
    }
}

/// Full capability record for one role
///
/// One field per [`Capability`], so a role can never be missing a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    // User management
    pub view_users: bool,
    pub create_users: bool,
    pub edit_users: bool,
    pub delete_users: bool,
    pub manage_roles: bool,
    // Documents
    pub view_documents: bool,
    pub upload_documents: bool,
    pub delete_documents: bool,
    pub bulk_import_documents: bool,
    // API keys
    pub view_api_keys: bool,
    pub create_api_keys: bool,
    pub delete_api_keys: bool,
    // Security events
    pub view_security_events: bool,
    pub resolve_security_events: bool,
    // Analytics and dashboard
    pub view_dashboard: bool,
    pub view_analytics: bool,
    pub export_analytics: bool,
    // Settings
    pub view_settings: bool,
    pub edit_settings: bool,
    // System administration
    pub view_system_health: bool,
    pub view_logs: bool,
    pub clear_cache: bool,
    pub manage_system: bool,
}

impl CapabilitySet {
    /// Look up a single flag
    pub fn get(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewUsers => self.view_users,
            Capability::CreateUsers => self.create_users,
            Capability::EditUsers => self.edit_users,
            Capability::DeleteUsers => self.delete_users,
            Capability::ManageRoles => self.manage_roles,
            Capability::ViewDocuments => self.view_documents,
            Capability::UploadDocuments => self.upload_documents,
            Capability::DeleteDocuments => self.delete_documents,
            Capability::BulkImportDocuments => self.bulk_import_documents,
            Capability::ViewApiKeys => self.view_api_keys,
            Capability::CreateApiKeys => self.create_api_keys,
            Capability::DeleteApiKeys => self.delete_api_keys,
            Capability::ViewSecurityEvents => self.view_security_events,
            Capability::ResolveSecurityEvents => self.resolve_security_events,
            Capability::ViewDashboard => self.view_dashboard,
            Capability::ViewAnalytics => self.view_analytics,
            Capability::ExportAnalytics => self.export_analytics,
            Capability::ViewSettings => self.view_settings,
            Capability::EditSettings => self.edit_settings,
            Capability::ViewSystemHealth => self.view_system_health,
            Capability::ViewLogs => self.view_logs,
            Capability::ClearCache => self.clear_cache,
            Capability::ManageSystem => self.manage_system,
        }
    }

    /// Granted capabilities in declaration order
    pub fn granted(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.get(*capability))
    }

    pub fn can_modify_users(&self) -> bool {
        self.create_users || self.edit_users || self.delete_users
    }

    pub fn can_modify_documents(&self) -> bool {
        self.upload_documents || self.delete_documents
    }

    pub fn can_modify_api_keys(&self) -> bool {
        self.create_api_keys || self.delete_api_keys
    }
}

const SUPER_ADMIN_CAPABILITIES: CapabilitySet = CapabilitySet {
    view_users: true,
    create_users: true,
    edit_users: true,
    delete_users: true,
    manage_roles: true,
    view_documents: true,
    upload_documents: true,
    delete_documents: true,
    bulk_import_documents: true,
    view_api_keys: true,
    create_api_keys: true,
    delete_api_keys: true,
    view_security_events: true,
    resolve_security_events: true,
    view_dashboard: true,
    view_analytics: true,
    export_analytics: true,
    view_settings: true,
    edit_settings: true,
    view_system_health: true,
    view_logs: true,
    clear_cache: true,
    manage_system: true,
};

const ADMIN_CAPABILITIES: CapabilitySet = CapabilitySet {
    view_users: true,
    create_users: true,
    edit_users: true,
    delete_users: true,
    manage_roles: false,
    view_documents: true,
    upload_documents: true,
    delete_documents: true,
    bulk_import_documents: true,
    view_api_keys: true,
    create_api_keys: true,
    delete_api_keys: true,
    view_security_events: true,
    resolve_security_events: true,
    view_dashboard: true,
    view_analytics: true,
    export_analytics: true,
    view_settings: true,
    edit_settings: true,
    view_system_health: true,
    view_logs: true,
    clear_cache: true,
    manage_system: false,
};

const DEVELOPER_CAPABILITIES: CapabilitySet = CapabilitySet {
    view_users: true,
    create_users: false,
    edit_users: false,
    delete_users: false,
    manage_roles: false,
    view_documents: true,
    upload_documents: true,
    delete_documents: false,
    bulk_import_documents: true,
    view_api_keys: true,
    create_api_keys: true,
    delete_api_keys: true,
    view_security_events: false,
    resolve_security_events: false,
    view_dashboard: true,
    view_analytics: true,
    export_analytics: false,
    view_settings: true,
    edit_settings: false,
    view_system_health: true,
    view_logs: true,
    clear_cache: false,
    manage_system: false,
};

const ANALYST_CAPABILITIES: CapabilitySet = CapabilitySet {
    view_users: false,
    create_users: false,
    edit_users: false,
    delete_users: false,
    manage_roles: false,
    view_documents: true,
    upload_documents: false,
    delete_documents: false,
    bulk_import_documents: false,
    view_api_keys: false,
    create_api_keys: false,
    delete_api_keys: false,
    view_security_events: true,
    resolve_security_events: false,
    view_dashboard: true,
    view_analytics: true,
    export_analytics: true,
    view_settings: false,
    edit_settings: false,
    view_system_health: true,
    view_logs: false,
    clear_cache: false,
    manage_system: false,
};

const USER_CAPABILITIES: CapabilitySet = CapabilitySet {
    view_users: false,
    create_users: false,
    edit_users: false,
    delete_users: false,
    manage_roles: false,
    view_documents: true,
    upload_documents: false,
    delete_documents: false,
    bulk_import_documents: false,
    view_api_keys: false,
    create_api_keys: false,
    delete_api_keys: false,
    view_security_events: false,
    resolve_security_events: false,
    view_dashboard: true,
    view_analytics: false,
    export_analytics: false,
    view_settings: false,
    edit_settings: false,
    view_system_health: false,
    view_logs: false,
    clear_cache: false,
    manage_system: false,
};

const READ_ONLY_CAPABILITIES: CapabilitySet = CapabilitySet {
    view_users: false,
    create_users: false,
    edit_users: false,
    delete_users: false,
    manage_roles: false,
    view_documents: true,
    upload_documents: false,
    delete_documents: false,
    bulk_import_documents: false,
    view_api_keys: false,
    create_api_keys: false,
    delete_api_keys: false,
    view_security_events: false,
    resolve_security_events: false,
    view_dashboard: true,
    view_analytics: true,
    export_analytics: false,
    view_settings: false,
    edit_settings: false,
    view_system_health: true,
    view_logs: false,
    clear_cache: false,
    manage_system: false,
};

/// Capability record for a role
pub fn permissions_for(role: Role) -> &'static CapabilitySet {
    match role {
        Role::SuperAdmin => &SUPER_ADMIN_CAPABILITIES,
        Role::Admin => &ADMIN_CAPABILITIES,
        Role::Developer => &DEVELOPER_CAPABILITIES,
        Role::Analyst => &ANALYST_CAPABILITIES,
        Role::User => &USER_CAPABILITIES,
        Role::ReadOnly => &READ_ONLY_CAPABILITIES,
    }
}

/// Capability record for a raw role value, failing closed to [`FAIL_CLOSED_ROLE`]
pub fn permissions_for_name(raw_role: &str) -> &'static CapabilitySet {
    permissions_for(raw_role.parse().unwrap_or(FAIL_CLOSED_ROLE))
}

pub fn has_capability(role: Role, capability: Capability) -> bool {
    permissions_for(role).get(capability)
}

/// Unknown capability names are never granted
pub fn has_capability_named(raw_role: &str, capability_name: &str) -> bool {
    capability_name
        .parse::<Capability>()
        .map(|capability| permissions_for_name(raw_role).get(capability))
        .unwrap_or(false)
}

pub fn can_modify_users(role: Role) -> bool {
    permissions_for(role).can_modify_users()
}

pub fn can_modify_documents(role: Role) -> bool {
    permissions_for(role).can_modify_documents()
}

pub fn can_modify_api_keys(role: Role) -> bool {
    permissions_for(role).can_modify_api_keys()
}

/// Roles that may look but not touch
pub fn is_view_only_role(role: Role) -> bool {
    matches!(role, Role::Analyst | Role::ReadOnly)
}

pub fn is_elevated_role(role: Role) -> bool {
    matches!(role, Role::Admin | Role::SuperAdmin)
}

/// Console-access gate shared by login and identity resolution
pub fn has_console_access(role: Role) -> bool {
    CONSOLE_ACCESS_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_has_everything() {
        let set = permissions_for(Role::SuperAdmin);
        assert_eq!(set.granted().count(), Capability::ALL.len());
    }

    #[test]
    fn composite_checks() {
        assert!(can_modify_users(Role::Admin));
        assert!(!can_modify_users(Role::Developer));
        assert!(can_modify_documents(Role::Developer));
        assert!(!can_modify_documents(Role::Analyst));
        assert!(can_modify_api_keys(Role::Developer));
        assert!(!can_modify_api_keys(Role::User));
        assert!(!can_modify_api_keys(Role::ReadOnly));
    }

    #[test]
    fn unknown_role_names_fail_closed() {
        assert_eq!(permissions_for_name("root"), permissions_for(Role::User));
        assert_eq!(permissions_for_name(""), permissions_for(Role::User));
        assert_eq!(permissions_for_name("admin"), permissions_for(Role::Admin));
    }

    #[test]
    fn named_capability_lookup() {
        assert!(has_capability_named("admin", "delete_users"));
        assert!(!has_capability_named("admin", "manage_system"));
        assert!(!has_capability_named("super_admin", "launch_missiles"));
        assert!(!has_capability_named("mystery", "create_users"));
        assert!(has_capability_named("mystery", "view_documents"));
    }

    #[test]
    fn domains_partition_all_capabilities() {
        let count = |domain: CapabilityDomain| {
            Capability::ALL
                .iter()
                .filter(|capability| capability.domain() == domain)
                .count()
        };
        assert_eq!(count(CapabilityDomain::UserManagement), 5);
        assert_eq!(count(CapabilityDomain::Documents), 4);
        assert_eq!(count(CapabilityDomain::ApiKeys), 3);
        assert_eq!(count(CapabilityDomain::SecurityEvents), 2);
        assert_eq!(count(CapabilityDomain::Analytics), 3);
        assert_eq!(count(CapabilityDomain::Settings), 2);
        assert_eq!(count(CapabilityDomain::System), 4);

        assert_eq!(Capability::ClearCache.domain(), CapabilityDomain::System);
        assert_eq!(Capability::ExportAnalytics.domain(), CapabilityDomain::Analytics);
    }

    #[test]
    fn capability_names_roundtrip() {
        for capability in Capability::ALL {
            assert_eq!(capability.as_str().parse::<Capability>(), Ok(capability));
            assert_eq!(
                serde_json::to_string(&capability).unwrap(),
                format!("\"{}\"", capability.as_str())
            );
        }
    }

    #[test]
    fn console_access_allow_list() {
        assert!(has_console_access(Role::SuperAdmin));
        assert!(has_console_access(Role::Admin));
        assert!(has_console_access(Role::Developer));
        assert!(has_console_access(Role::Analyst));
        assert!(!has_console_access(Role::User));
        assert!(!has_console_access(Role::ReadOnly));
    }

    #[test]
    fn fail_closed_role_is_least_privileged() {
        let fallback = permissions_for(FAIL_CLOSED_ROLE).granted().count();
        for role in Role::ALL {
            assert!(permissions_for(role).granted().count() >= fallback);
        }
    }

    #[test]
    fn view_only_roles_cannot_modify_anything() {
        for role in Role::ALL.into_iter().filter(|r| is_view_only_role(*r)) {
            assert!(!can_modify_users(role));
            assert!(!can_modify_documents(role));
            assert!(!can_modify_api_keys(role));
        }
    }
}
