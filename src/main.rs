//! Hyperion - Fabric profile launcher for Minecraft
//!
//! Command-line entry point.
//!
//! # Execution Flow
//!
//! 1. Parse the command line
//! 2. Open the settings directory (`~/.hyperion-launcher`) and load `launcher.yaml`
//! 3. Initialize logging → `~/.hyperion-launcher/logs/hyperion.<date>`
//! 4. Run the command on a current-thread tokio runtime
//! 5. Log the metrics summary and exit (nonzero when a launch failed)

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use hyperion::logging::{self, LOG_PREFIX};
use hyperion::models::DEFAULT_PROFILE;
use hyperion::paths::{self, LauncherPaths};
use hyperion::services::{LaunchEvent, LaunchEventKind, MIN_HEAP_MB, MemoryPlan};
use hyperion::{APP_NAME, ConfigManager, LaunchOrchestrator, LauncherConfig, PreferencesPatch, ProfileRegistry, VERSION};
use std::process::ExitCode;
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(name = "hyperion")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install, sync and launch Fabric profiles")]
pub struct Cli {
    /// Verbose logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install the profile's runtime if needed, sync its mods and start the game
    Play {
        /// Profile to play
        #[arg(short, long, default_value = DEFAULT_PROFILE)]
        profile: String,

        /// Offline username (defaults to the last one used)
        #[arg(short, long)]
        username: Option<String>,

        /// Maximum heap in MB (defaults to the saved preference)
        #[arg(short, long, value_name = "MB")]
        memory: Option<u64>,

        /// Game directory (defaults to the saved override or the bundled .minecraft)
        #[arg(short, long, value_name = "PATH")]
        dir: Option<Utf8PathBuf>,
    },

    /// List available profiles
    Profiles,

    /// Show or change saved preferences
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Show system memory and the allowed heap range
    Memory,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Merge the given values into the saved preferences
    Set {
        #[arg(long, value_name = "MB")]
        memory: Option<u32>,

        #[arg(long)]
        username: Option<String>,

        #[arg(long, value_name = "BOOL")]
        close_on_launch: Option<bool>,

        /// Game directory override; pass an empty string to clear it
        #[arg(long, value_name = "PATH")]
        dir: Option<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let settings_dir = paths::settings_dir();
    let config_manager = ConfigManager::new(&settings_dir)?;
    let launcher_config = config_manager.load_launcher_config()?;

    let debug = cli.debug || launcher_config.debug;
    // Held until exit so buffered log lines are flushed.
    let _log_guard = logging::setup_logging(&settings_dir.join("logs"), LOG_PREFIX, debug, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let exit_code = runtime.block_on(run(cli.command, config_manager, launcher_config))?;

    tracing::info!("Shutdown complete");
    Ok(exit_code)
}

async fn run(
    command: Commands,
    config_manager: ConfigManager,
    launcher_config: LauncherConfig,
) -> Result<ExitCode> {
    match command {
        Commands::Play {
            profile,
            username,
            memory,
            dir,
        } => play(config_manager, launcher_config, profile, username, memory, dir).await,
        Commands::Profiles => {
            for profile in ProfileRegistry::builtin().profiles() {
                println!("{:<10} {}", profile.id, profile.runtime_id);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Settings { action: None } => {
            print_preferences(&config_manager.load_preferences())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Settings {
            action:
                Some(SettingsAction::Set {
                    memory,
                    username,
                    close_on_launch,
                    dir,
                }),
        } => {
            let patch = PreferencesPatch {
                memory_mb: memory,
                last_username: username,
                close_on_launch,
                game_dir_override: dir,
            };
            if patch.is_empty() {
                bail!("Nothing to change; pass at least one of --memory, --username, --close-on-launch, --dir");
            }
            print_preferences(&config_manager.update_preferences(patch))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Memory => {
            let plan = MemoryPlan::detect(launcher_config.reserved_memory_mb, launcher_config.memory_step_mb);
            println!("Total memory: {} MB", plan.total_mb);
            println!(
                "Allowed heap: {}-{} MB in {} MB steps",
                MIN_HEAP_MB,
                plan.ceiling_mb(),
                plan.step_mb
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn play(
    config_manager: ConfigManager,
    launcher_config: LauncherConfig,
    profile: String,
    username: Option<String>,
    memory: Option<u64>,
    dir: Option<Utf8PathBuf>,
) -> Result<ExitCode> {
    let paths = LauncherPaths::discover(&launcher_config)?;
    let preferences = config_manager.load_preferences();

    let target_dir = dir.unwrap_or_else(|| paths.game_dir(&preferences));
    let username = username.unwrap_or_else(|| preferences.last_username.clone());
    let memory = memory.unwrap_or(u64::from(preferences.memory_mb));

    let orchestrator = LaunchOrchestrator::assemble(config_manager, &launcher_config, &paths);
    let mut events = orchestrator.subscribe_launch_events();

    let result = orchestrator
        .play_profile(&profile, &username, memory, &target_dir)
        .await;

    let exit_code = if !result.ok {
        eprintln!("Launch failed: {}", result.error.as_deref().unwrap_or("unknown error"));
        ExitCode::FAILURE
    } else if result.close_launcher {
        println!("Game started");
        ExitCode::SUCCESS
    } else {
        println!("Game started, waiting for it to exit");
        wait_for_exit(&mut events).await;
        ExitCode::SUCCESS
    };

    orchestrator.metrics().log_summary();
    Ok(exit_code)
}

/// Block until the game reports its exit. Output lines are already logged
/// by the launch adapter.
async fn wait_for_exit(events: &mut broadcast::Receiver<LaunchEvent>) {
    loop {
        match events.recv().await {
            Ok(LaunchEvent {
                kind: LaunchEventKind::Close { code },
                ..
            }) => {
                println!("Game exited with code {}", code.map_or("none".to_string(), |c| c.to_string()));
                break;
            }
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_preferences(preferences: &hyperion::Preferences) -> Result<()> {
    let yaml = serde_yaml_ng::to_string(preferences).context("Failed to format preferences")?;
    print!("{}", yaml);
    Ok(())
}
