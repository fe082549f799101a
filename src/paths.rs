//! Filesystem roots the launcher works from.
//!
//! A packaged install keeps its reference files (installer jar, mod sets and
//! the default `.minecraft`) under `resources/` next to the executable. When
//! run from a source checkout the same files live under the development root
//! (the current directory). Candidate lists always put the packaged location
//! first.

use crate::models::{LauncherConfig, Preferences};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

const SETTINGS_DIR_NAME: &str = ".hyperion-launcher";
const GAME_DIR_NAME: &str = ".minecraft";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    resources_dir: Utf8PathBuf,
    dev_root: Utf8PathBuf,
}

impl LauncherPaths {
    pub fn new(resources_dir: impl Into<Utf8PathBuf>, dev_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            resources_dir: resources_dir.into(),
            dev_root: dev_root.into(),
        }
    }

    /// Resolve the roots for this process, honoring config overrides.
    pub fn discover(config: &LauncherConfig) -> Result<Self> {
        let resources_dir = match &config.resources_dir {
            Some(dir) => dir.clone(),
            None => {
                let exe = std::env::current_exe().context("Failed to locate launcher executable")?;
                let exe = Utf8PathBuf::try_from(exe)
                    .context("Launcher executable path is not valid UTF-8")?;
                exe.parent()
                    .map(|dir| dir.join("resources"))
                    .unwrap_or_else(|| Utf8PathBuf::from("resources"))
            }
        };

        let dev_root = match &config.dev_root {
            Some(dir) => dir.clone(),
            None => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                Utf8PathBuf::try_from(cwd).context("Current directory is not valid UTF-8")?
            }
        };

        tracing::debug!("Resources dir: {}, dev root: {}", resources_dir, dev_root);
        Ok(Self::new(resources_dir, dev_root))
    }

    pub fn resources_dir(&self) -> &Utf8Path {
        &self.resources_dir
    }

    pub fn dev_root(&self) -> &Utf8Path {
        &self.dev_root
    }

    /// True when the launcher runs from a packaged install.
    pub fn is_packaged(&self) -> bool {
        self.resources_dir.is_dir()
    }

    /// Game directory: the user's override, else the bundled `.minecraft`.
    pub fn game_dir(&self, preferences: &Preferences) -> Utf8PathBuf {
        if let Some(dir) = preferences.game_dir_override() {
            return dir;
        }
        if self.is_packaged() {
            self.resources_dir.join(GAME_DIR_NAME)
        } else {
            self.dev_root.join(GAME_DIR_NAME)
        }
    }

    /// Where the installer jar may live, most preferred first.
    pub fn installer_candidates(&self, jar_name: &str) -> Vec<Utf8PathBuf> {
        vec![
            self.resources_dir.join(jar_name),
            self.dev_root.join("resources").join(jar_name),
            self.dev_root.join(jar_name),
        ]
    }

    /// Where the reference mod directory `dir_name` may live, most preferred first.
    pub fn asset_candidates(&self, dir_name: &str) -> Vec<Utf8PathBuf> {
        vec![
            self.resources_dir.join(GAME_DIR_NAME).join(dir_name),
            self.dev_root.join(GAME_DIR_NAME).join(dir_name),
        ]
    }
}

/// JVM binary `name` under `java_home/bin`, or the bare name for a `PATH` lookup.
pub fn java_binary(java_home: Option<&Utf8Path>, name: &str) -> String {
    match java_home {
        Some(home) => {
            let file = if cfg!(target_os = "windows") {
                format!("{}.exe", name)
            } else {
                name.to_string()
            };
            home.join("bin").join(file).into_string()
        }
        None => name.to_string(),
    }
}

/// Per-user directory holding `settings.yaml`, `launcher.yaml` and logs.
pub fn settings_dir() -> Utf8PathBuf {
    dirs::home_dir()
        .and_then(|home| Utf8PathBuf::try_from(home).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("."))
        .join(SETTINGS_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_game_dir_prefers_override() {
        let paths = LauncherPaths::new("/nonexistent/resources", "/src/hyperion");
        let prefs = Preferences {
            game_dir_override: "/games/mc".to_string(),
            ..Preferences::default()
        };
        assert_eq!(paths.game_dir(&prefs), Utf8PathBuf::from("/games/mc"));
    }

    #[test]
    fn test_game_dir_dev_fallback() {
        let paths = LauncherPaths::new("/nonexistent/resources", "/src/hyperion");
        assert_eq!(
            paths.game_dir(&Preferences::default()),
            Utf8PathBuf::from("/src/hyperion/.minecraft")
        );
    }

    #[test]
    fn test_game_dir_packaged() {
        let temp = TempDir::new().unwrap();
        let resources = utf8(&temp).join("resources");
        std::fs::create_dir_all(&resources).unwrap();

        let paths = LauncherPaths::new(&resources, "/src/hyperion");
        assert!(paths.is_packaged());
        assert_eq!(paths.game_dir(&Preferences::default()), resources.join(".minecraft"));
    }

    #[test]
    fn test_java_binary() {
        assert_eq!(java_binary(None, "javaw"), "javaw");

        let home = Utf8PathBuf::from("/usr/lib/jvm/java-21");
        let binary = java_binary(Some(&home), "java");
        assert!(binary.starts_with("/usr/lib/jvm/java-21"));
        assert!(binary.contains("bin"));
    }

    #[test]
    fn test_candidate_order_packaged_first() {
        let paths = LauncherPaths::new("/opt/hyperion/resources", "/src/hyperion");

        let installers = paths.installer_candidates("fabric-installer.jar");
        assert_eq!(installers[0], Utf8PathBuf::from("/opt/hyperion/resources/fabric-installer.jar"));
        assert_eq!(installers.len(), 3);

        let assets = paths.asset_candidates("mods-1.21.4");
        assert_eq!(
            assets,
            vec![
                Utf8PathBuf::from("/opt/hyperion/resources/.minecraft/mods-1.21.4"),
                Utf8PathBuf::from("/src/hyperion/.minecraft/mods-1.21.4"),
            ]
        );
    }
}
