//! Property checks over the role capability table

use consolekit_auth::auth::{
    has_capability_named, has_console_access, is_elevated_role, is_view_only_role,
    permissions_for, permissions_for_name, Capability, Role, FAIL_CLOSED_ROLE,
};
use proptest::prelude::*;

fn any_role() -> impl Strategy<Value = Role> {
    proptest::sample::select(Role::ALL.to_vec())
}

/// Spellings the server is allowed to send, compared ASCII-case-insensitively
const ACCEPTED_SPELLINGS: [&str; 8] = [
    "super_admin",
    "superadmin",
    "admin",
    "developer",
    "analyst",
    "user",
    "readonly",
    "read_only",
];

fn is_accepted_spelling(s: &str) -> bool {
    let bare = s.strip_prefix("UserRole.").unwrap_or(s);
    ACCEPTED_SPELLINGS
        .iter()
        .any(|spelling| bare.eq_ignore_ascii_case(spelling))
}

fn unknown_role_name() -> impl Strategy<Value = String> {
    "[A-Za-z_. -]{0,24}".prop_filter("must not be an accepted spelling", |s| {
        !is_accepted_spelling(s)
    })
}

/// A real role name with one separator slipped in somewhere
fn mangled_role_name() -> impl Strategy<Value = String> {
    (
        any_role(),
        any::<proptest::sample::Index>(),
        proptest::sample::select(vec!['_', '-', ' ', '.']),
        any::<bool>(),
    )
        .prop_map(|(role, at, separator, prefixed)| {
            let name = role.as_str();
            let mut mangled = name.to_string();
            mangled.insert(at.index(name.len() + 1), separator);
            if prefixed {
                format!("UserRole.{mangled}")
            } else {
                mangled
            }
        })
        .prop_filter("must not be an accepted spelling", |s| {
            !is_accepted_spelling(s)
        })
}

proptest! {
    #[test]
    fn unknown_roles_fail_closed(name in unknown_role_name()) {
        prop_assert_eq!(permissions_for_name(&name), permissions_for(FAIL_CLOSED_ROLE));
        prop_assert_eq!(permissions_for_name(&name), permissions_for(Role::User));
    }

    #[test]
    fn mangled_roles_are_rejected(name in mangled_role_name()) {
        prop_assert!(name.parse::<Role>().is_err());
        prop_assert_eq!(permissions_for_name(&name), permissions_for(Role::User));
    }

    #[test]
    fn every_role_declares_every_capability(role in any_role()) {
        let value = serde_json::to_value(permissions_for(role)).unwrap();
        let fields = value.as_object().unwrap();
        prop_assert_eq!(fields.len(), Capability::ALL.len());
        for capability in Capability::ALL {
            prop_assert!(fields.contains_key(capability.as_str()));
        }
    }

    #[test]
    fn view_only_is_analyst_or_readonly(role in any_role()) {
        prop_assert_eq!(
            is_view_only_role(role),
            matches!(role, Role::Analyst | Role::ReadOnly)
        );
    }

    #[test]
    fn elevated_is_admin_or_super_admin(role in any_role()) {
        prop_assert_eq!(
            is_elevated_role(role),
            matches!(role, Role::Admin | Role::SuperAdmin)
        );
    }

    #[test]
    fn server_enum_spelling_resolves(role in any_role()) {
        let spelled = format!("UserRole.{}", role.as_str().to_uppercase());
        prop_assert_eq!(spelled.parse::<Role>(), Ok(role));
        prop_assert_eq!(permissions_for_name(&spelled), permissions_for(role));
    }

    #[test]
    fn named_lookup_matches_table(role in any_role(), index in 0..Capability::ALL.len()) {
        let capability = Capability::ALL[index];
        prop_assert_eq!(
            has_capability_named(role.as_str(), capability.as_str()),
            permissions_for(role).get(capability)
        );
    }
}

#[test]
fn console_access_allow_list() {
    let allowed: Vec<Role> = Role::ALL
        .into_iter()
        .filter(|role| has_console_access(*role))
        .collect();
    assert_eq!(
        allowed,
        vec![Role::SuperAdmin, Role::Admin, Role::Developer, Role::Analyst]
    );
}

#[test]
fn near_miss_role_names_fail_closed() {
    for name in [
        "a_d_m_i_n",
        "ad-min",
        "s u p e r a d m i n",
        "UserRole.A_DMIN",
        "super-admin",
        "read-only",
        "de_veloper",
        " analyst",
        "UserRole. ADMIN",
    ] {
        assert!(name.parse::<Role>().is_err(), "{name:?} parsed as a role");
        assert_eq!(permissions_for_name(name), permissions_for(Role::User));
        assert!(!has_capability_named(name, "view_users"));
    }
}

#[test]
fn unknown_capability_is_never_granted() {
    for role in Role::ALL {
        assert!(!has_capability_named(role.as_str(), "launch_rockets"));
    }
}

#[test]
fn super_admin_holds_everything() {
    let set = permissions_for(Role::SuperAdmin);
    assert_eq!(set.granted().count(), Capability::ALL.len());
    assert!(set.can_modify_users());
    assert!(set.can_modify_documents());
    assert!(set.can_modify_api_keys());
}

#[test]
fn readonly_cannot_modify_anything() {
    let set = permissions_for(Role::ReadOnly);
    assert!(!set.can_modify_users());
    assert!(!set.can_modify_documents());
    assert!(!set.can_modify_api_keys());
}
