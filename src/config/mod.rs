use crate::models::{LauncherConfig, Preferences, PreferencesPatch};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;

const PREFERENCES_FILE: &str = "settings.yaml";
const LEGACY_PREFERENCES_FILE: &str = "settings.json";
const LAUNCHER_CONFIG_FILE: &str = "launcher.yaml";
const ENV_PREFIX: &str = "HYPERION";

/// Configuration manager for the launcher's settings directory.
///
/// Manages two files:
/// - `settings.yaml`: user preferences (memory, last username, close on launch, game dir)
/// - `launcher.yaml`: launcher configuration, overlaid by `HYPERION_*` environment variables
///
/// Preference loading and saving never fail across this boundary: problems
/// are logged and defaults (or the requested values) are returned instead.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    preferences_path: Utf8PathBuf,
    legacy_preferences_path: Utf8PathBuf,
    launcher_config_path: Utf8PathBuf,
}

/// Preferences as the previous JSON-based launcher stored them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyPreferences {
    ram_mb: Option<u32>,
    last_username: String,
    minecraft_dir_override: String,
    close_on_play: bool,
}

impl From<LegacyPreferences> for Preferences {
    fn from(legacy: LegacyPreferences) -> Self {
        let defaults = Preferences::default();
        Self {
            memory_mb: legacy.ram_mb.unwrap_or(defaults.memory_mb),
            last_username: legacy.last_username,
            close_on_launch: legacy.close_on_play,
            game_dir_override: legacy.minecraft_dir_override,
        }
    }
}

impl ConfigManager {
    /// Create a new ConfigManager rooted at `config_dir`, creating it if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            preferences_path: config_dir.join(PREFERENCES_FILE),
            legacy_preferences_path: config_dir.join(LEGACY_PREFERENCES_FILE),
            launcher_config_path: config_dir.join(LAUNCHER_CONFIG_FILE),
            config_dir,
        })
    }

    /// Load user preferences, falling back to defaults on any problem.
    pub fn load_preferences(&self) -> Preferences {
        match self.try_load_preferences() {
            Ok(preferences) => preferences,
            Err(e) => {
                tracing::warn!("Using default preferences: {:#}", e);
                Preferences::default()
            }
        }
    }

    fn try_load_preferences(&self) -> Result<Preferences> {
        if self.preferences_path.exists() {
            let contents = fs::read_to_string(&self.preferences_path).with_context(|| {
                format!("Failed to read preferences: {}", self.preferences_path)
            })?;
            let preferences: Preferences = serde_yaml_ng::from_str(&contents).with_context(|| {
                format!("Failed to parse preferences: {}", self.preferences_path)
            })?;
            tracing::debug!("Loaded preferences from {}", self.preferences_path);
            return Ok(preferences);
        }

        if self.legacy_preferences_path.exists() {
            tracing::info!("Using legacy preferences file: {}", self.legacy_preferences_path);
            let contents = fs::read_to_string(&self.legacy_preferences_path).with_context(|| {
                format!("Failed to read legacy preferences: {}", self.legacy_preferences_path)
            })?;
            let legacy: LegacyPreferences = serde_json::from_str(&contents).with_context(|| {
                format!("Failed to parse legacy preferences: {}", self.legacy_preferences_path)
            })?;
            return Ok(legacy.into());
        }

        tracing::debug!(
            "Preferences file not found at {}, using defaults",
            self.preferences_path
        );
        Ok(Preferences::default())
    }

    /// Persist preferences and return what was requested to be stored.
    ///
    /// Write failures are logged; the caller still gets the merged record.
    pub fn save_preferences(&self, preferences: &Preferences) -> Preferences {
        if let Err(e) = self.try_save_preferences(preferences) {
            tracing::error!("Failed to save preferences: {:#}", e);
        }
        preferences.clone()
    }

    fn try_save_preferences(&self, preferences: &Preferences) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(preferences)
            .context("Failed to serialize preferences to YAML")?;

        fs::write(&self.preferences_path, yaml_string)
            .with_context(|| format!("Failed to write preferences: {}", self.preferences_path))?;

        tracing::debug!("Saved preferences to {}", self.preferences_path);
        Ok(())
    }

    /// Read the stored preferences, apply `patch` and write the result back.
    ///
    /// No concurrency control: the last writer wins.
    pub fn update_preferences(&self, patch: PreferencesPatch) -> Preferences {
        let merged = self.load_preferences().merged(patch);
        self.save_preferences(&merged)
    }

    /// Load the launcher configuration from `launcher.yaml` (optional) with
    /// `HYPERION_*` environment variables layered on top.
    pub fn load_launcher_config(&self) -> Result<LauncherConfig> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(self.launcher_config_path.as_std_path()).required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| {
                format!("Failed to read launcher config: {}", self.launcher_config_path)
            })?;

        let launcher_config: LauncherConfig = settings
            .try_deserialize()
            .with_context(|| {
                format!("Failed to parse launcher config: {}", self.launcher_config_path)
            })?;

        tracing::debug!("Launcher config: {:?}", launcher_config);
        Ok(launcher_config)
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn preferences_path(&self) -> &Utf8Path {
        &self.preferences_path
    }

    pub fn launcher_config_path(&self) -> &Utf8Path {
        &self.launcher_config_path
    }
}
