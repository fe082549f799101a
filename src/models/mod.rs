//! Data models for the Hyperion launcher.
//!
//! - [`ProfileRegistry`] / [`Profile`] / [`RuntimeId`]: the closed set of playable
//!   profiles and the runtime identifier each one derives
//! - [`Preferences`] / [`PreferencesPatch`]: the persisted user record
//! - [`LauncherConfig`]: layered launcher configuration (paths, JVM, memory policy)
//! - [`LaunchConfiguration`]: the per-attempt input to the process-launch delegate
//! - [`LaunchResult`]: the normalized outcome handed back to the front end
//! - [`LauncherState`]: runtime state observed through [`StateManager`](crate::state::StateManager)

pub mod launch;
pub mod launcher_state;
pub mod preferences;
pub mod profile;

pub use launch::{
    LaunchConfiguration, LaunchResult, MemoryBounds, OfflineIdentity, OsFamily, VersionDescriptor,
};
pub use launcher_state::{LaunchStep, LauncherState};
pub use preferences::{LauncherConfig, Preferences, PreferencesPatch};
pub use profile::{DEFAULT_PROFILE, FABRIC_LOADER_VERSION, Profile, ProfileRegistry, RuntimeId};
