use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// User preferences persisted to `settings.yaml`.
///
/// Missing keys fall back to their defaults when loading, so older files keep
/// working as fields are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Requested maximum heap for the game, in MB.
    #[serde(rename = "Memory MB")]
    pub memory_mb: u32,

    #[serde(rename = "Last Username")]
    pub last_username: String,

    /// Ask the front end to exit after a successful launch.
    #[serde(rename = "Close On Launch")]
    pub close_on_launch: bool,

    /// Game directory to use instead of the bundled one. Empty means unset.
    #[serde(rename = "Game Dir Override")]
    pub game_dir_override: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            memory_mb: 4096,
            last_username: String::new(),
            close_on_launch: false,
            game_dir_override: String::new(),
        }
    }
}

impl Preferences {
    pub fn game_dir_override(&self) -> Option<Utf8PathBuf> {
        let trimmed = self.game_dir_override.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Utf8PathBuf::from(trimmed))
        }
    }

    /// Apply a partial update on top of these preferences.
    pub fn merged(mut self, patch: PreferencesPatch) -> Self {
        if let Some(memory_mb) = patch.memory_mb {
            self.memory_mb = memory_mb;
        }
        if let Some(last_username) = patch.last_username {
            self.last_username = last_username;
        }
        if let Some(close_on_launch) = patch.close_on_launch {
            self.close_on_launch = close_on_launch;
        }
        if let Some(game_dir_override) = patch.game_dir_override {
            self.game_dir_override = game_dir_override;
        }
        self
    }
}

/// Partial preferences update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub memory_mb: Option<u32>,
    pub last_username: Option<String>,
    pub close_on_launch: Option<bool>,
    pub game_dir_override: Option<String>,
}

impl PreferencesPatch {
    pub fn last_username(username: impl Into<String>) -> Self {
        Self {
            last_username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Launcher-level configuration, layered from `launcher.yaml` and
/// `HYPERION_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// JVM installation root; `java`/`javaw` are looked up on `PATH` when unset.
    pub java_home: Option<Utf8PathBuf>,

    /// Packaged resources directory; defaults to `resources/` beside the executable.
    pub resources_dir: Option<Utf8PathBuf>,

    /// Development tree root; defaults to the current directory.
    pub dev_root: Option<Utf8PathBuf>,

    /// File name of the Fabric installer jar.
    pub installer_jar: String,

    /// Memory kept back for the operating system, in MB.
    pub reserved_memory_mb: u64,

    /// Granularity of the heap ceiling, in MB.
    pub memory_step_mb: u64,

    pub debug: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            java_home: None,
            resources_dir: None,
            dev_root: None,
            installer_jar: "fabric-installer.jar".to_string(),
            reserved_memory_mb: 1024,
            memory_step_mb: 256,
            debug: false,
        }
    }
}
