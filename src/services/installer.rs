use crate::error::{InstallFailure, LauncherError, LauncherResult};
use crate::models::RuntimeId;
use crate::services::probe::{CandidateKind, probe_first_async};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::process::Command;

/// A fully assembled external installer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl InstallerCommand {
    /// Printable form for logs (arguments containing spaces are quoted).
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.contains(' ') {
                    format!("\"{}\"", part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs an external process to completion and reports its exit code.
///
/// The seam between the installer logic and the operating system; tests
/// substitute a mock that fakes the installer's filesystem effects.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `command` and wait for it. Killed-by-signal exits report `-1`.
    async fn run(&self, command: &InstallerCommand) -> std::io::Result<i32>;
}

/// [`ProcessRunner`] backed by `tokio::process`, inheriting stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: &InstallerCommand) -> std::io::Result<i32> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .await?;
        Ok(status.code().unwrap_or(-1))
    }
}

/// Result of [`RuntimeInstaller::ensure_installed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Descriptor was already present; nothing ran.
    AlreadyInstalled,
    /// The installer ran and its descriptor was verified.
    Installed,
}

/// Makes sure the Fabric runtime for a profile exists in a game directory.
///
/// Installation state is the presence of the version descriptor
/// `<target>/versions/<id>/<id>.json`, which only the external installer
/// writes. Concurrent calls for the same runtime are not coordinated: two
/// callers that both observe a missing descriptor will both run the installer.
pub struct RuntimeInstaller {
    runner: Arc<dyn ProcessRunner>,
    java_program: String,
    installer_candidates: Vec<Utf8PathBuf>,
}

impl RuntimeInstaller {
    /// # Arguments
    /// * `java_program` - JVM used to run the installer jar
    /// * `installer_candidates` - Installer jar locations, most preferred first
    pub fn new(java_program: impl Into<String>, installer_candidates: Vec<Utf8PathBuf>) -> Self {
        Self {
            runner: Arc::new(TokioProcessRunner),
            java_program: java_program.into(),
            installer_candidates,
        }
    }

    /// Replace the process runner (used by tests and alternative front ends).
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn descriptor_path(target_dir: &Utf8Path, runtime_id: &RuntimeId) -> Utf8PathBuf {
        let id = runtime_id.to_string();
        target_dir
            .join("versions")
            .join(&id)
            .join(format!("{}.json", id))
    }

    pub async fn is_installed(target_dir: &Utf8Path, runtime_id: &RuntimeId) -> LauncherResult<bool> {
        let descriptor = Self::descriptor_path(target_dir, runtime_id);
        tokio::fs::try_exists(&descriptor)
            .await
            .map_err(|e| LauncherError::io(descriptor, e))
    }

    /// Build the installer command line:
    /// `java -jar <installer> client -dir <target> -mcversion <base> -loader <loader> -noprofile`
    pub fn build_command(
        &self,
        installer_jar: &Utf8Path,
        target_dir: &Utf8Path,
        runtime_id: &RuntimeId,
    ) -> InstallerCommand {
        InstallerCommand {
            program: self.java_program.clone(),
            args: vec![
                "-jar".to_string(),
                installer_jar.to_string(),
                "client".to_string(),
                "-dir".to_string(),
                target_dir.to_string(),
                "-mcversion".to_string(),
                runtime_id.base_version().to_string(),
                "-loader".to_string(),
                runtime_id.loader_version().to_string(),
                "-noprofile".to_string(),
            ],
        }
    }

    /// Install `runtime_id` into `target_dir` unless its descriptor already exists.
    ///
    /// # Errors
    /// - [`LauncherError::InstallerNotFound`] when no installer jar candidate exists
    /// - [`LauncherError::InstallFailed`] on spawn failure or nonzero exit
    /// - [`LauncherError::InstallVerificationFailed`] when the installer exits 0
    ///   without producing the descriptor
    pub async fn ensure_installed(
        &self,
        target_dir: &Utf8Path,
        runtime_id: &RuntimeId,
    ) -> LauncherResult<InstallOutcome> {
        let descriptor = Self::descriptor_path(target_dir, runtime_id);

        if Self::is_installed(target_dir, runtime_id).await? {
            tracing::debug!("Runtime {} already installed at {}", runtime_id, descriptor);
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        if let Some(parent) = descriptor.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let installer_jar =
            probe_first_async(self.installer_candidates.clone(), CandidateKind::File)
                .await?
                .ok_or_else(|| LauncherError::InstallerNotFound {
                    searched: self.installer_candidates.clone(),
                })?;

        let command = self.build_command(&installer_jar, target_dir, runtime_id);
        tracing::info!("Installing runtime {}: {}", runtime_id, command.display_line());

        let start = Instant::now();
        let exit_code = self.runner.run(&command).await.map_err(|e| {
            tracing::error!("Failed to run installer: {}", e);
            LauncherError::InstallFailed(InstallFailure::Spawn(e.to_string()))
        })?;

        tracing::info!(
            "Installer finished in {:.2}s with exit code {}",
            start.elapsed().as_secs_f32(),
            exit_code
        );

        if exit_code != 0 {
            return Err(LauncherError::InstallFailed(InstallFailure::ExitCode(exit_code)));
        }

        if !Self::is_installed(target_dir, runtime_id).await? {
            tracing::error!("Installer exited cleanly but {} is missing", descriptor);
            return Err(LauncherError::InstallVerificationFailed { descriptor });
        }

        Ok(InstallOutcome::Installed)
    }
}
