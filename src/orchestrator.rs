//! The play pipeline: resolve, install, sync, launch.

use crate::config::ConfigManager;
use crate::error::{LauncherError, LauncherResult};
use crate::metrics::Metrics;
use crate::models::{
    LaunchConfiguration, LaunchResult, LaunchStep, LauncherConfig, OfflineIdentity, OsFamily,
    PreferencesPatch, Profile, ProfileRegistry, VersionDescriptor,
};
use crate::paths::{LauncherPaths, java_binary};
use crate::services::{
    AssetSyncOutcome, AssetSynchronizer, InstallOutcome, JavaGameLauncher, LaunchAdapter,
    LaunchEvent, MemoryPlan, RuntimeInstaller,
};
use crate::state::StateManager;
use camino::Utf8Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;

/// Runs play requests end to end.
///
/// One request at a time: the launch guard in [`StateManager`] rejects a
/// second request while one is in flight. Every outcome, including errors,
/// comes back as a [`LaunchResult`].
pub struct LaunchOrchestrator {
    registry: ProfileRegistry,
    installer: RuntimeInstaller,
    assets: AssetSynchronizer,
    launcher: LaunchAdapter,
    config: ConfigManager,
    memory: MemoryPlan,
    state: Arc<StateManager>,
    metrics: Arc<Metrics>,
    os: OsFamily,
    executable: String,
}

impl LaunchOrchestrator {
    pub fn new(
        registry: ProfileRegistry,
        installer: RuntimeInstaller,
        assets: AssetSynchronizer,
        launcher: LaunchAdapter,
        config: ConfigManager,
        memory: MemoryPlan,
    ) -> Self {
        let os = OsFamily::current();
        Self {
            registry,
            installer,
            assets,
            launcher,
            config,
            memory,
            state: Arc::new(StateManager::new()),
            metrics: Arc::new(Metrics::new()),
            os,
            executable: os.java_executable().to_string(),
        }
    }

    /// Wire up the production services from launcher configuration.
    pub fn assemble(config: ConfigManager, launcher_config: &LauncherConfig, paths: &LauncherPaths) -> Self {
        let java_home = launcher_config.java_home.as_deref();
        let installer = RuntimeInstaller::new(
            java_binary(java_home, "java"),
            paths.installer_candidates(&launcher_config.installer_jar),
        );

        let asset_paths = paths.clone();
        let assets = AssetSynchronizer::new(move |dir_name| asset_paths.asset_candidates(dir_name));

        let launcher = LaunchAdapter::new(Arc::new(JavaGameLauncher::new()));
        let memory = MemoryPlan::detect(
            launcher_config.reserved_memory_mb,
            launcher_config.memory_step_mb,
        );

        let os = OsFamily::current();
        Self::new(ProfileRegistry::builtin(), installer, assets, launcher, config, memory)
            .with_platform(os, java_binary(java_home, os.java_executable()))
    }

    /// Override the target OS and the JVM used to start the game.
    pub fn with_platform(mut self, os: OsFamily, executable: impl Into<String>) -> Self {
        self.os = os;
        self.executable = executable.into();
        self
    }

    pub fn with_state(mut self, state: Arc<StateManager>) -> Self {
        self.state = state;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn memory_plan(&self) -> &MemoryPlan {
        &self.memory
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn state(&self) -> &Arc<StateManager> {
        &self.state
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Events (game output, exit) from every launch made by this orchestrator.
    pub fn subscribe_launch_events(&self) -> broadcast::Receiver<LaunchEvent> {
        self.launcher.subscribe()
    }

    /// Install, sync and start `profile_id` in `target_dir` as `username`.
    ///
    /// `last_username` is saved only after the game process was dispatched.
    pub async fn play_profile(
        &self,
        profile_id: &str,
        username: &str,
        memory_mb: u64,
        target_dir: &Utf8Path,
    ) -> LaunchResult {
        if !self.state.try_begin_launch(profile_id) {
            tracing::warn!("Ignoring play request for {}: launch in progress", profile_id);
            return LaunchResult::failure(LauncherError::LaunchInProgress.to_string());
        }

        let start = Instant::now();
        let result = match self.run_pipeline(profile_id, username, memory_mb, target_dir).await {
            Ok(close_launcher) => {
                tracing::info!("Profile {} launched in {:.2}s", profile_id, start.elapsed().as_secs_f32());
                LaunchResult::success(close_launcher)
            }
            Err(e) => {
                tracing::error!("Launching profile {} failed: {}", profile_id, e);
                LaunchResult::failure(e.to_string())
            }
        };

        self.metrics.record_launch(result.ok, start.elapsed());
        self.state.finish_launch(result.clone());
        result
    }

    async fn run_pipeline(
        &self,
        profile_id: &str,
        username: &str,
        memory_mb: u64,
        target_dir: &Utf8Path,
    ) -> LauncherResult<bool> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LauncherError::EmptyUsername);
        }
        let profile = self.registry.resolve(profile_id)?;

        self.state.set_step(LaunchStep::Installing);
        match self.installer.ensure_installed(target_dir, &profile.runtime_id).await? {
            InstallOutcome::Installed => self.metrics.record_runtime_install(),
            InstallOutcome::AlreadyInstalled => self.metrics.record_runtime_install_skip(),
        }

        self.state.set_step(LaunchStep::SyncingAssets);
        match self.assets.sync_assets(target_dir, profile).await? {
            AssetSyncOutcome::Copied { files, .. } => self.metrics.record_assets_copied(files),
            AssetSyncOutcome::SourceMissing { .. } => {
                self.metrics.record_asset_source_missing();
                self.state.warn(format!(
                    "No bundled mods for {}, launching with the current mods folder",
                    profile.id
                ));
            }
        }

        self.state.set_step(LaunchStep::Launching);
        let config = self.build_configuration(profile, username, memory_mb, target_dir);
        let handle = self.launcher.launch(&config).await?;
        tracing::info!("Game started (launch #{}, pid {:?})", handle.launch_id, handle.pid);

        let config = self.config.clone();
        let patch = PreferencesPatch::last_username(username);
        let close_on_launch =
            match tokio::task::spawn_blocking(move || config.update_preferences(patch)).await {
                Ok(preferences) => preferences.close_on_launch,
                Err(e) => {
                    tracing::error!("Failed to update preferences: {}", e);
                    false
                }
            };
        Ok(close_on_launch)
    }

    /// Launch configuration for `profile`; `memory_mb` is clamped to the
    /// machine's allowed range.
    pub fn build_configuration(
        &self,
        profile: &Profile,
        username: &str,
        memory_mb: u64,
        target_dir: &Utf8Path,
    ) -> LaunchConfiguration {
        LaunchConfiguration {
            root: target_dir.to_path_buf(),
            os: self.os,
            identity: OfflineIdentity::offline(username),
            executable: self.executable.clone(),
            version: VersionDescriptor::release(&profile.base_version, &profile.runtime_id.to_string()),
            memory: self.memory.bounds(memory_mb),
        }
    }
}
