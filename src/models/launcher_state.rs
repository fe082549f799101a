use super::LaunchResult;
use std::fmt;

/// Pipeline step currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchStep {
    #[default]
    Idle,
    Installing,
    SyncingAssets,
    Launching,
}

impl fmt::Display for LaunchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LaunchStep::Idle => "idle",
            LaunchStep::Installing => "installing runtime",
            LaunchStep::SyncingAssets => "syncing mods",
            LaunchStep::Launching => "starting game",
        };
        f.write_str(label)
    }
}

/// Single source of truth for launcher runtime state.
///
/// Wrapped in `Arc<RwLock<_>>` by [`crate::state::StateManager`]; never
/// mutate it directly. `is_launching` plays the role of the disabled play
/// button: while it is set, new play requests are refused.
#[derive(Clone, Debug, Default)]
pub struct LauncherState {
    pub is_launching: bool,
    pub current_profile: Option<String>,
    pub current_step: LaunchStep,

    // Status line shown to the user
    pub status_message: String,
    pub status_is_error: bool,

    pub last_result: Option<LaunchResult>,
}

impl LauncherState {
    pub fn finish(&mut self, result: LaunchResult) {
        self.is_launching = false;
        self.current_step = LaunchStep::Idle;
        self.status_is_error = !result.ok;
        self.status_message = match &result.error {
            Some(message) => message.clone(),
            None => "Game started".to_string(),
        };
        self.last_result = Some(result);
    }
}
