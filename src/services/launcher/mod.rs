//! Process-launch boundary.
//!
//! [`GameLauncher`] is the seam to whatever actually starts the game. The
//! [`LaunchAdapter`] sits in front of it for the lifetime of the launcher:
//! it validates configurations, hands every launch a fresh correlation id and
//! fans all delegate events out over one broadcast channel. A single logging
//! listener is registered when the adapter is built, so repeated launches
//! never stack up handlers.

mod java;

pub use java::JavaGameLauncher;

use crate::error::{LauncherError, LauncherResult};
use crate::models::{LaunchConfiguration, MemoryBounds};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

const EVENT_BUFFER: usize = 256;

/// What the delegate reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEventKind {
    Debug(String),
    /// One line of game output.
    Data(String),
    /// The game process exited.
    Close { code: Option<i32> },
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchEvent {
    pub launch_id: u64,
    pub kind: LaunchEventKind,
}

/// Emitter handed to the delegate for a single launch; stamps every event
/// with that launch's id.
#[derive(Debug, Clone)]
pub struct LaunchEventSink {
    launch_id: u64,
    tx: broadcast::Sender<LaunchEvent>,
}

impl LaunchEventSink {
    pub fn launch_id(&self) -> u64 {
        self.launch_id
    }

    pub fn emit(&self, kind: LaunchEventKind) {
        // No receivers is fine: nobody is listening for this launch.
        let _ = self.tx.send(LaunchEvent {
            launch_id: self.launch_id,
            kind,
        });
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.emit(LaunchEventKind::Debug(message.into()));
    }
}

/// Handle to a started game process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchHandle {
    pub launch_id: u64,
    pub pid: Option<u32>,
}

/// Starts the game described by a [`LaunchConfiguration`].
///
/// Implementations return once the process is spawned; everything after that
/// (output, exit) is reported through the sink.
#[async_trait]
pub trait GameLauncher: Send + Sync {
    async fn launch(
        &self,
        config: &LaunchConfiguration,
        events: LaunchEventSink,
    ) -> LauncherResult<LaunchHandle>;
}

/// Long-lived wrapper around one [`GameLauncher`].
pub struct LaunchAdapter {
    delegate: Arc<dyn GameLauncher>,
    events_tx: broadcast::Sender<LaunchEvent>,
    next_launch_id: AtomicU64,
}

impl LaunchAdapter {
    /// Wrap `delegate` and, when called inside a tokio runtime, start the
    /// logging listener.
    pub fn new(delegate: Arc<dyn GameLauncher>) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(log_events(events_tx.subscribe()));
            }
            Err(_) => tracing::debug!("No runtime available, launch events will not be logged"),
        }

        Self {
            delegate,
            events_tx,
            next_launch_id: AtomicU64::new(1),
        }
    }

    /// Receive events from every launch made through this adapter.
    pub fn subscribe(&self) -> broadcast::Receiver<LaunchEvent> {
        self.events_tx.subscribe()
    }

    /// Validate `config` and hand it to the delegate.
    ///
    /// # Errors
    /// Both invalid configurations and delegate failures come back as
    /// [`LauncherError::LaunchFailed`].
    pub async fn launch(&self, config: &LaunchConfiguration) -> LauncherResult<LaunchHandle> {
        validate(config)?;

        let launch_id = self.next_launch_id.fetch_add(1, Ordering::Relaxed);
        let sink = LaunchEventSink {
            launch_id,
            tx: self.events_tx.clone(),
        };

        tracing::info!(
            "Launch #{}: {} ({}) as {} with {}..{} heap",
            launch_id,
            config.version.custom,
            config.version.number,
            config.identity.name,
            config.memory.min,
            config.memory.max
        );

        match self.delegate.launch(config, sink.clone()).await {
            Ok(handle) => Ok(handle),
            Err(e) => {
                let reason = match e {
                    LauncherError::LaunchFailed { reason } => reason,
                    other => other.to_string(),
                };
                sink.emit(LaunchEventKind::Error(reason.clone()));
                Err(LauncherError::LaunchFailed { reason })
            }
        }
    }
}

/// Reject configurations the delegate could not possibly start.
pub fn validate(config: &LaunchConfiguration) -> LauncherResult<()> {
    let required = [
        ("root", config.root.as_str()),
        ("executable", config.executable.as_str()),
        ("username", config.identity.name.as_str()),
        ("version number", config.version.number.as_str()),
        ("custom version", config.version.custom.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(LauncherError::launch_failed(format!(
                "invalid launch configuration: {} is empty",
                field
            )));
        }
    }

    let min = MemoryBounds::parse_mb(&config.memory.min);
    let max = MemoryBounds::parse_mb(&config.memory.max);
    match (min, max) {
        (Some(min), Some(max)) if min <= max => Ok(()),
        (Some(_), Some(_)) => Err(LauncherError::launch_failed(format!(
            "invalid launch configuration: minimum heap {} exceeds maximum {}",
            config.memory.min, config.memory.max
        ))),
        _ => Err(LauncherError::launch_failed(format!(
            "invalid launch configuration: unreadable heap bounds {}..{}",
            config.memory.min, config.memory.max
        ))),
    }
}

async fn log_events(mut rx: broadcast::Receiver<LaunchEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match event.kind {
                LaunchEventKind::Debug(message) => {
                    tracing::debug!("[launch #{}] {}", event.launch_id, message)
                }
                LaunchEventKind::Data(line) => {
                    tracing::info!("[launch #{}] {}", event.launch_id, line)
                }
                LaunchEventKind::Close { code } => {
                    tracing::info!("[launch #{}] game exited with {:?}", event.launch_id, code)
                }
                LaunchEventKind::Error(message) => {
                    tracing::error!("[launch #{}] {}", event.launch_id, message)
                }
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Launch log listener skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
