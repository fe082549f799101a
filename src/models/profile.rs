use crate::error::{LauncherError, LauncherResult};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Fabric loader version shipped with every built-in profile.
pub const FABRIC_LOADER_VERSION: &str = "0.17.3";

/// Profile selected when the user has not picked one.
pub const DEFAULT_PROFILE: &str = "1.21.4";

const RUNTIME_ID_PREFIX: &str = "fabric-loader";

static RUNTIME_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^fabric-loader-([^-]+)-([^-]+)$").expect("Invalid runtime id regex")
});

/// Identifier of an installed loader + game version combination.
///
/// Only produced by [`RuntimeId::derive`] or [`RuntimeId::parse`]; the
/// textual form is `fabric-loader-<loader>-<base>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RuntimeId {
    loader_version: String,
    base_version: String,
}

impl RuntimeId {
    pub fn derive(loader_version: &str, base_version: &str) -> Self {
        Self {
            loader_version: loader_version.to_string(),
            base_version: base_version.to_string(),
        }
    }

    /// Parse the textual form back into its two components.
    ///
    /// Anything that does not split into exactly four hyphen-delimited fields
    /// starting with `fabric-loader` is rejected.
    pub fn parse(raw: &str) -> LauncherResult<Self> {
        let captures = RUNTIME_ID_PATTERN
            .captures(raw)
            .ok_or_else(|| LauncherError::MalformedRuntimeId(raw.to_string()))?;

        Ok(Self {
            loader_version: captures[1].to_string(),
            base_version: captures[2].to_string(),
        })
    }

    pub fn loader_version(&self) -> &str {
        &self.loader_version
    }

    pub fn base_version(&self) -> &str {
        &self.base_version
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            RUNTIME_ID_PREFIX, self.loader_version, self.base_version
        )
    }
}

/// A fixed (game version, loader version) combination offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: String,
    pub base_version: String,
    pub loader_version: String,
    pub runtime_id: RuntimeId,
}

impl Profile {
    fn new(id: &str, base_version: &str, loader_version: &str) -> Self {
        Self {
            id: id.to_string(),
            base_version: base_version.to_string(),
            loader_version: loader_version.to_string(),
            runtime_id: RuntimeId::derive(loader_version, base_version),
        }
    }

    /// Name of the reference mod directory for this profile (`mods-<version>`).
    pub fn asset_dir_name(&self) -> String {
        format!("mods-{}", self.base_version)
    }
}

/// Closed set of profiles the launcher knows about.
///
/// Immutable once built. [`ProfileRegistry::builtin`] is what the launcher
/// ships with; [`ProfileRegistry::from_entries`] exists for single-modpack
/// builds and tests.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: IndexMap<String, Profile>,
}

impl ProfileRegistry {
    pub fn builtin() -> Self {
        Self::collect(&[
            ("1.21.4", "1.21.4", FABRIC_LOADER_VERSION),
            ("1.21.8", "1.21.8", FABRIC_LOADER_VERSION),
        ])
    }

    /// Build a registry from `(id, base_version, loader_version)` triples.
    /// Later duplicates of an id are ignored.
    ///
    /// Fails with [`LauncherError::MalformedRuntimeId`] when a version is
    /// empty or contains `-`, since the derived identifier would not parse back.
    pub fn from_entries(entries: &[(&str, &str, &str)]) -> LauncherResult<Self> {
        for (_, base, loader) in entries {
            RuntimeId::parse(&RuntimeId::derive(loader, base).to_string())?;
        }
        Ok(Self::collect(entries))
    }

    fn collect(entries: &[(&str, &str, &str)]) -> Self {
        let mut profiles = IndexMap::new();
        for (id, base, loader) in entries {
            profiles
                .entry(id.to_string())
                .or_insert_with(|| Profile::new(id, base, loader));
        }
        Self { profiles }
    }

    pub fn resolve(&self, profile_id: &str) -> LauncherResult<&Profile> {
        self.profiles
            .get(profile_id)
            .ok_or_else(|| LauncherError::UnknownProfile(profile_id.to_string()))
    }

    /// Profiles in declaration order.
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_runtime_ids() {
        let registry = ProfileRegistry::builtin();
        let profile = registry.resolve("1.21.4").unwrap();
        assert_eq!(profile.runtime_id.to_string(), "fabric-loader-0.17.3-1.21.4");

        let profile = registry.resolve("1.21.8").unwrap();
        assert_eq!(profile.runtime_id.to_string(), "fabric-loader-0.17.3-1.21.8");
    }

    #[test]
    fn test_unknown_profile() {
        let registry = ProfileRegistry::builtin();
        assert!(matches!(
            registry.resolve("1.20.1"),
            Err(LauncherError::UnknownProfile(id)) if id == "1.20.1"
        ));
        assert!(registry.resolve("").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_version() {
        assert!(matches!(
            RuntimeId::parse("fabric-loader-0.17.3"),
            Err(LauncherError::MalformedRuntimeId(_))
        ));
        assert!(RuntimeId::parse("fabric-loader-0.17.3-1.21.4-extra").is_err());
        assert!(RuntimeId::parse("quilt-loader-0.17.3-1.21.4").is_err());
    }

    #[test]
    fn test_asset_dir_name() {
        let registry = ProfileRegistry::builtin();
        assert_eq!(registry.resolve("1.21.8").unwrap().asset_dir_name(), "mods-1.21.8");
    }

    #[test]
    fn test_from_entries_rejects_hyphenated_versions() {
        let result =
            ProfileRegistry::from_entries(&[("snap", "1.21.5-pre1", FABRIC_LOADER_VERSION)]);
        assert!(matches!(
            result,
            Err(LauncherError::MalformedRuntimeId(id)) if id == "fabric-loader-0.17.3-1.21.5-pre1"
        ));
    }

    #[test]
    fn test_registry_keeps_declaration_order() {
        let registry = ProfileRegistry::builtin();
        let ids: Vec<_> = registry.profiles().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1.21.4", "1.21.8"]);
    }
}
