use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

/// How an installer run failed before its output could be verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallFailure {
    /// The installer ran and exited with a nonzero code (-1 when killed by a signal).
    ExitCode(i32),
    /// The installer could not be spawned or waited on.
    Spawn(String),
}

impl fmt::Display for InstallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallFailure::ExitCode(code) => write!(f, "installer exited with code {}", code),
            InstallFailure::Spawn(reason) => write!(f, "installer could not be started: {}", reason),
        }
    }
}

/// Errors produced by the launch pipeline.
///
/// Every pipeline step returns `Result<T, LauncherError>`. The orchestrator
/// converts whatever aborts the pipeline into a [`LaunchResult`](crate::models::LaunchResult)
/// so no raw error crosses into the front end.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("Unknown profile: '{0}'")]
    UnknownProfile(String),

    #[error("Malformed runtime identifier: '{0}'")]
    MalformedRuntimeId(String),

    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("A launch is already in progress")]
    LaunchInProgress,

    #[error("Runtime installer not found (searched: {})", join_paths(.searched))]
    InstallerNotFound { searched: Vec<Utf8PathBuf> },

    #[error("{path} exists but cannot be read: {source}")]
    CandidateUnreadable {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Runtime install failed: {0}")]
    InstallFailed(InstallFailure),

    #[error("Installer reported success but {descriptor} was not created")]
    InstallVerificationFailed { descriptor: Utf8PathBuf },

    #[error("No asset source for profile {profile} (searched: {})", join_paths(.searched))]
    AssetSourceMissing {
        profile: String,
        searched: Vec<Utf8PathBuf>,
    },

    #[error("Asset copy failed at {path}: {source}")]
    AssetCopyFailed {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Game launch failed: {reason}")]
    LaunchFailed { reason: String },

    #[error("IO error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
}

impl LauncherError {
    pub fn launch_failed(reason: impl Into<String>) -> Self {
        LauncherError::LaunchFailed {
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type LauncherResult<T> = Result<T, LauncherError>;

fn join_paths(paths: &[Utf8PathBuf]) -> String {
    if paths.is_empty() {
        return "<none>".to_string();
    }
    paths
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
