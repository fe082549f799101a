//! Integration tests for StateManager with state change events
//!
//! These tests verify that the StateManager correctly:
//! - Emits state change events across a launch
//! - Supports multiple subscribers
//! - Holds the launch guard against concurrent claims
//! - Always releases the guard when a launch finishes

use hyperion::models::{LaunchResult, LaunchStep};
use hyperion::{StateChange, StateManager};
use std::sync::Arc;
use tokio::time::{Duration, timeout};

async fn next_event(rx: &mut tokio::sync::broadcast::Receiver<StateChange>) -> StateChange {
    timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed")
}

#[tokio::test]
async fn test_launch_lifecycle_events() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    assert!(state.try_begin_launch("1.21.4"));
    state.set_step(LaunchStep::Installing);
    state.set_step(LaunchStep::Launching);
    state.finish_launch(LaunchResult::success(false));

    assert_eq!(
        next_event(&mut rx).await,
        StateChange::LaunchStarted {
            profile: "1.21.4".to_string()
        }
    );
    assert_eq!(
        next_event(&mut rx).await,
        StateChange::StepChanged {
            step: LaunchStep::Installing
        }
    );
    assert_eq!(
        next_event(&mut rx).await,
        StateChange::StepChanged {
            step: LaunchStep::Launching
        }
    );
    assert!(matches!(
        next_event(&mut rx).await,
        StateChange::LaunchFinished { ok: true, .. }
    ));
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let state = Arc::new(StateManager::new());
    let mut receivers = vec![state.subscribe(), state.subscribe(), state.subscribe()];

    assert!(state.try_begin_launch("1.21.8"));

    for rx in receivers.iter_mut() {
        assert!(matches!(
            next_event(rx).await,
            StateChange::LaunchStarted { profile } if profile == "1.21.8"
        ));
    }
}

#[tokio::test]
async fn test_failure_is_reported_and_guard_released() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    assert!(state.try_begin_launch("1.21.4"));
    let _ = next_event(&mut rx).await;

    state.finish_launch(LaunchResult::failure("Runtime install failed: installer exited with code 1"));

    match next_event(&mut rx).await {
        StateChange::LaunchFinished { ok, message } => {
            assert!(!ok);
            assert!(message.contains("exited with code 1"));
        }
        other => panic!("Expected LaunchFinished, got {:?}", other),
    }

    let snapshot = state.snapshot();
    assert!(!snapshot.is_launching);
    assert!(snapshot.status_is_error);
    assert_eq!(snapshot.current_step, LaunchStep::Idle);
    assert!(state.try_begin_launch("1.21.4"));
}

#[tokio::test]
async fn test_warning_keeps_launch_running() {
    let state = Arc::new(StateManager::new());
    assert!(state.try_begin_launch("1.21.4"));
    let mut rx = state.subscribe();

    state.warn("No bundled mods for 1.21.4");

    assert_eq!(
        next_event(&mut rx).await,
        StateChange::StatusChanged {
            message: "No bundled mods for 1.21.4".to_string(),
            is_error: false
        }
    );
    assert!(state.is_launching());
}

#[tokio::test]
async fn test_concurrent_launch_claims() {
    let state = Arc::new(StateManager::new());

    let mut handles = vec![];
    for i in 0..10 {
        let state_clone = state.clone();
        handles.push(tokio::spawn(async move {
            state_clone.try_begin_launch(&format!("profile-{}", i))
        }));
    }

    let mut claimed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            claimed += 1;
        }
    }

    assert_eq!(claimed, 1, "Exactly one task may hold the launch guard");
    assert!(state.is_launching());
}

#[test]
fn test_claim_without_runtime() {
    // Broadcasting does not need a runtime; a blocking front end can drive it.
    let state = StateManager::new();
    let mut rx = state.subscribe();

    assert!(state.try_begin_launch("1.21.4"));
    assert!(!state.try_begin_launch("1.21.8"));

    let event = tokio_test::block_on(rx.recv()).unwrap();
    assert!(matches!(event, StateChange::LaunchStarted { .. }));
}
