//! Services module - the steps of the launch pipeline.
//!
//! Each service owns one side effect and knows nothing about the front end or
//! about the other steps; [`LaunchOrchestrator`](crate::orchestrator::LaunchOrchestrator)
//! strings them together.
//!
//! # Components
//!
//! - [`RuntimeInstaller`]: installs the Fabric runtime for a profile by running
//!   the external installer jar, unless the version descriptor already exists.
//! - [`AssetSynchronizer`]: mirrors the profile's reference mod set into the
//!   game directory.
//! - [`MemoryPlan`]: heap ceiling and clamping from detected system memory.
//! - [`LaunchAdapter`] / [`GameLauncher`]: the process-launch boundary, with
//!   [`JavaGameLauncher`] as the default delegate.
//! - [`probe_first`]: ordered lookup used by the installer and the synchronizer.

pub mod assets;
pub mod installer;
pub mod launcher;
pub mod memory;
pub mod probe;

pub use assets::{AssetSyncOutcome, AssetSynchronizer};
pub use installer::{InstallOutcome, InstallerCommand, ProcessRunner, RuntimeInstaller, TokioProcessRunner};
pub use launcher::{
    GameLauncher, JavaGameLauncher, LaunchAdapter, LaunchEvent, LaunchEventKind, LaunchEventSink,
    LaunchHandle,
};
pub use memory::{MIN_HEAP_MB, MemoryPlan, SystemMemory};
pub use probe::{CandidateKind, probe_first, probe_first_async};
