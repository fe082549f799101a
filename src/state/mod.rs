// State management module
//
// This module provides the StateManager which wraps LauncherState with thread-safe access
// using Arc<RwLock<T>> and emits change events for front-end updates.

use crate::models::{LaunchResult, LaunchStep, LauncherState};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// A play request was accepted
    LaunchStarted { profile: String },

    /// The pipeline moved to another step
    StepChanged { step: LaunchStep },

    /// The play request finished (either way)
    LaunchFinished { ok: bool, message: String },

    /// Status line changed without a step change (warnings)
    StatusChanged { message: String, is_error: bool },
}

/// Thread-safe state manager with event emission
///
/// - Provides thread-safe access to [`LauncherState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Owns the launch guard: [`try_begin_launch`](Self::try_begin_launch) is the
///   equivalent of disabling the play control for the duration of a launch
pub struct StateManager {
    state: Arc<RwLock<LauncherState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state and a 100 event buffer
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(LauncherState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state
    pub fn snapshot(&self) -> LauncherState {
        self.read_lock().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let busy = state_manager.read(|state| state.is_launching);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&LauncherState) -> R,
    {
        f(&self.read_lock())
    }

    /// Update the state and emit change events
    ///
    /// Captures the old state, applies `update_fn`, then emits one event per
    /// detected difference. Returns the emitted events.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut LauncherState),
    {
        let mut state = self.write_lock();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);
        drop(state);

        for change in &changes {
            // Nobody listening is fine
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &LauncherState, new: &LauncherState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if !old.is_launching && new.is_launching {
            changes.push(StateChange::LaunchStarted {
                profile: new.current_profile.clone().unwrap_or_default(),
            });
        }

        if old.current_step != new.current_step && new.is_launching {
            changes.push(StateChange::StepChanged {
                step: new.current_step,
            });
        }

        if old.is_launching && !new.is_launching {
            let (ok, message) = match &new.last_result {
                Some(result) => (result.ok, new.status_message.clone()),
                None => (false, new.status_message.clone()),
            };
            changes.push(StateChange::LaunchFinished { ok, message });
        } else if changes.is_empty()
            && (old.status_message != new.status_message
                || old.status_is_error != new.status_is_error)
        {
            // Start and step events already imply a new status line.
            changes.push(StateChange::StatusChanged {
                message: new.status_message.clone(),
                is_error: new.status_is_error,
            });
        }

        changes
    }

    // Convenience methods for the launch pipeline

    /// Claim the launch guard for `profile`.
    ///
    /// Returns `false` (and changes nothing) if a launch is already running.
    pub fn try_begin_launch(&self, profile: &str) -> bool {
        let mut state = self.write_lock();
        if state.is_launching {
            return false;
        }
        let old_state = state.clone();

        state.is_launching = true;
        state.current_profile = Some(profile.to_string());
        state.current_step = LaunchStep::Idle;
        state.status_message = format!("Preparing profile {}", profile);
        state.status_is_error = false;

        let changes = Self::detect_changes(&old_state, &state);
        drop(state);

        for change in changes {
            let _ = self.state_tx.send(change);
        }
        true
    }

    /// Move the running launch to another step
    pub fn set_step(&self, step: LaunchStep) -> Vec<StateChange> {
        self.update(|state| {
            state.current_step = step;
            state.status_message = format!("{}...", step);
            state.status_is_error = false;
        })
    }

    /// Show a non-fatal warning while the pipeline keeps going
    pub fn warn(&self, message: impl Into<String>) -> Vec<StateChange> {
        let message = message.into();
        self.update(|state| {
            state.status_message = message;
            state.status_is_error = false;
        })
    }

    /// Release the launch guard and record the outcome
    pub fn finish_launch(&self, result: LaunchResult) -> Vec<StateChange> {
        self.update(|state| state.finish(result))
    }

    pub fn is_launching(&self) -> bool {
        self.read(|state| state.is_launching)
    }

    // Poisoning only happens if a closure above panicked; the state itself is
    // plain data, so keep serving it.
    fn read_lock(&self) -> RwLockReadGuard<'_, LauncherState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, LauncherState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
