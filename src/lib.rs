// Hyperion - Fabric profile launcher for Minecraft
//
// This is the library crate containing the launch pipeline and its data structures.
// The binary crate (main.rs) provides the command-line entry point.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod paths;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use error::{LauncherError, LauncherResult};
pub use models::{LaunchResult, LauncherConfig, Preferences, PreferencesPatch, ProfileRegistry, RuntimeId};
pub use orchestrator::LaunchOrchestrator;
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
