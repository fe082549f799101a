use camino::Utf8PathBuf;
use serde::Serialize;
use std::fmt;
use uuid::Builder;

/// Operating system family, as the version descriptor rules name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Windows,
    Osx,
    Linux,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsFamily::Windows
        } else if cfg!(target_os = "macos") {
            OsFamily::Osx
        } else {
            OsFamily::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::Osx => "osx",
            OsFamily::Linux => "linux",
        }
    }

    /// JVM executable name: the console-less `javaw` on Windows, `java` elsewhere.
    pub fn java_executable(&self) -> &'static str {
        match self {
            OsFamily::Windows => "javaw",
            _ => "java",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offline-mode identity. No authentication is performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfflineIdentity {
    pub name: String,
    pub uuid: String,
    pub access_token: String,
    pub user_type: String,
}

impl OfflineIdentity {
    /// Build the identity for `username` using the vanilla offline UUID
    /// scheme (name-based MD5 of `OfflinePlayer:<name>`).
    pub fn offline(username: &str) -> Self {
        let name = username.trim().to_string();
        let digest = md5::compute(format!("OfflinePlayer:{}", name).as_bytes());
        let uuid = Builder::from_md5_bytes(digest.0).into_uuid();
        let uuid = uuid.simple().to_string();

        Self {
            access_token: uuid.clone(),
            name,
            uuid,
            user_type: "legacy".to_string(),
        }
    }
}

/// Version the delegate should start: the base game version plus the custom
/// (loader) version directory that inherits from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionDescriptor {
    pub number: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub custom: String,
}

impl VersionDescriptor {
    pub fn release(number: &str, custom: &str) -> Self {
        Self {
            number: number.to_string(),
            kind: "release".to_string(),
            custom: custom.to_string(),
        }
    }
}

/// Heap bounds as JVM size strings (`"<N>M"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryBounds {
    pub min: String,
    pub max: String,
}

impl MemoryBounds {
    pub fn from_mb(min_mb: u64, max_mb: u64) -> Self {
        Self {
            min: format!("{}M", min_mb),
            max: format!("{}M", max_mb),
        }
    }

    /// Parse a `"<N>M"` string back into megabytes.
    pub fn parse_mb(value: &str) -> Option<u64> {
        value.strip_suffix('M')?.parse().ok()
    }
}

/// Everything the process-launch delegate needs for one launch attempt.
/// Built fresh per attempt and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchConfiguration {
    pub root: Utf8PathBuf,
    pub os: OsFamily,
    pub identity: OfflineIdentity,
    /// JVM executable (bare name looked up on `PATH`, or a full path).
    pub executable: String,
    pub version: VersionDescriptor,
    pub memory: MemoryBounds,
}

/// Normalized outcome of a play attempt, safe to hand to any front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchResult {
    pub ok: bool,
    pub error: Option<String>,
    /// Front end should close itself (only ever set on success).
    pub close_launcher: bool,
}

impl LaunchResult {
    pub fn success(close_launcher: bool) -> Self {
        Self {
            ok: true,
            error: None,
            close_launcher,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
            close_launcher: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_uuid_is_stable_and_versioned() {
        let a = OfflineIdentity::offline("Steve");
        let b = OfflineIdentity::offline("  Steve ");
        assert_eq!(a, b);
        assert_eq!(a.name, "Steve");
        assert_eq!(a.uuid.len(), 32);
        // version nibble of a name-based MD5 UUID
        assert_eq!(&a.uuid[12..13], "3");
    }

    #[test]
    fn test_memory_bounds_strings() {
        let bounds = MemoryBounds::from_mb(512, 7168);
        assert_eq!(bounds.min, "512M");
        assert_eq!(bounds.max, "7168M");
        assert_eq!(MemoryBounds::parse_mb(&bounds.max), Some(7168));
        assert_eq!(MemoryBounds::parse_mb("7G"), None);
    }

    #[test]
    fn test_java_executable_per_platform() {
        assert_eq!(OsFamily::Windows.java_executable(), "javaw");
        assert_eq!(OsFamily::Linux.java_executable(), "java");
        assert_eq!(OsFamily::Osx.java_executable(), "java");
    }
}
