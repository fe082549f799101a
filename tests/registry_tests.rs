//! Profile registry and runtime identifier tests

use hyperion::models::{DEFAULT_PROFILE, FABRIC_LOADER_VERSION};
use hyperion::{LauncherError, ProfileRegistry, RuntimeId};
use proptest::prelude::*;

#[test]
fn test_builtin_profiles() {
    let registry = ProfileRegistry::builtin();
    let ids: Vec<_> = registry.profiles().map(|p| p.id.as_str()).collect();

    assert_eq!(ids, vec!["1.21.4", "1.21.8"]);
    assert!(registry.resolve(DEFAULT_PROFILE).is_ok());
}

#[test]
fn test_every_builtin_runtime_id_round_trips() {
    for profile in ProfileRegistry::builtin().profiles() {
        let raw = profile.runtime_id.to_string();
        let parsed = RuntimeId::parse(&raw).unwrap();

        assert_eq!(parsed.loader_version(), FABRIC_LOADER_VERSION);
        assert_eq!(parsed.base_version(), profile.base_version);
        assert_eq!(parsed, profile.runtime_id);
    }
}

#[test]
fn test_resolve_rejects_unknown_and_empty() {
    let registry = ProfileRegistry::builtin();

    for bad in ["", "1.20.1", " 1.21.4", "1.21.4 "] {
        assert!(
            matches!(registry.resolve(bad), Err(LauncherError::UnknownProfile(id)) if id == bad),
            "{:?} should be rejected",
            bad
        );
    }
}

#[test]
fn test_parse_rejects_short_identifiers() {
    for bad in ["fabric-loader-0.17.3", "fabric-loader-", "0.17.3-1.21.4", "forge-0.17.3-1.21.4"] {
        assert!(
            matches!(RuntimeId::parse(bad), Err(LauncherError::MalformedRuntimeId(_))),
            "{:?} should not parse",
            bad
        );
    }
}

#[test]
fn test_single_profile_registry() {
    let registry = ProfileRegistry::from_entries(&[("modpack", "1.0", "2.0")]).unwrap();
    let profile = registry.resolve("modpack").unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(profile.runtime_id.to_string(), "fabric-loader-2.0-1.0");
    assert_eq!(profile.asset_dir_name(), "mods-1.0");
}

#[test]
fn test_from_entries_rejects_versions_that_do_not_round_trip() {
    let cases = [
        ("snapshot", "1.21.5-pre1", "0.17.3"),
        ("loader", "1.21.4", "0.17.3-beta"),
        ("empty-base", "", "0.17.3"),
        ("empty-loader", "1.21.4", ""),
    ];
    for entry in cases {
        assert!(
            matches!(
                ProfileRegistry::from_entries(&[("ok", "1.21.4", "0.17.3"), entry]),
                Err(LauncherError::MalformedRuntimeId(_))
            ),
            "{:?} should be rejected",
            entry
        );
    }
}

proptest! {
    #[test]
    fn runtime_id_round_trips(loader in "[0-9]{1,2}(\\.[0-9]{1,3}){1,2}", base in "[0-9]{1,2}(\\.[0-9]{1,3}){1,2}") {
        let derived = RuntimeId::derive(&loader, &base);
        let parsed = RuntimeId::parse(&derived.to_string()).unwrap();
        prop_assert_eq!(parsed.loader_version(), loader.as_str());
        prop_assert_eq!(parsed.base_version(), base.as_str());
    }
}
