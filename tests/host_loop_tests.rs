// Integration tests for the async host loop
//
// Runs the real tokio ticker with paused time so ticks fire deterministically:
// 1. Inputs reach the controller in order
// 2. The periodic tick moves the worm once per interval and stops at game over
// 3. Pause and resume from the overlay gate tick progress
// 4. The loop and its tick schedule stop once every host handle is dropped

use std::time::Duration;
use tokio::time::timeout;

use cyber_worm::config::Config;
use cyber_worm::controller::Snapshot;
use cyber_worm::event_log::EventLogger;
use cyber_worm::host::GameHost;
use cyber_worm::simulation::CollisionKind;
use cyber_worm::types::{Direction, GamePhase, HostEvent, InputEvent};

fn test_config() -> Config {
    let mut config = Config::default_hardcoded();
    config.session.seed = Some(4242);
    config.rules.initial_obstacles = 0;
    config.rules.escalation_enabled = false;
    config.scores.enabled = false;
    config
}

async fn wait_for<F>(host: &GameHost, mut done: F) -> Snapshot
where
    F: FnMut(&Snapshot) -> bool,
{
    let mut rx = host.subscribe();
    timeout(Duration::from_secs(60), async move {
        loop {
            {
                let snapshot = rx.borrow_and_update();
                if done(&snapshot) {
                    return snapshot.clone();
                }
            }
            rx.changed().await.expect("host loop stopped");
        }
    })
    .await
    .expect("condition not reached in time")
}

#[tokio::test(start_paused = true)]
async fn test_host_runs_until_boundary() {
    let (host, _handle) = GameHost::spawn(&test_config(), None, EventLogger::disabled());
    assert_eq!(host.snapshot().phase, GamePhase::Menu);

    host.input(InputEvent::Confirm).unwrap();
    wait_for(&host, |s| s.phase == GamePhase::Ready).await;

    host.input(InputEvent::Turn(Direction::Up)).unwrap();
    let finished = wait_for(&host, |s| s.phase == GamePhase::GameOver).await;

    assert_eq!(finished.ticks, 12);
    assert_eq!(finished.last_collision, Some(CollisionKind::Boundary));
    assert_eq!(finished.chain[0].y, 12);

    // No further ticks arrive once the schedule is cancelled
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(host.snapshot().ticks, 12);
}

#[tokio::test(start_paused = true)]
async fn test_host_pause_freezes_movement() {
    let (host, _handle) = GameHost::spawn(&test_config(), None, EventLogger::disabled());
    host.input(InputEvent::Confirm).unwrap();
    host.input(InputEvent::Turn(Direction::Right)).unwrap();
    wait_for(&host, |s| s.ticks >= 2).await;

    host.send(HostEvent::Pause).unwrap();
    let paused = wait_for(&host, |s| s.paused).await;

    tokio::time::sleep(Duration::from_secs(3)).await;
    let still = host.snapshot();
    assert_eq!(still.ticks, paused.ticks);
    assert_eq!(still.chain, paused.chain);

    host.send(HostEvent::Resume).unwrap();
    let resumed = wait_for(&host, |s| s.ticks > paused.ticks).await;
    assert!(!resumed.paused);
}

#[tokio::test(start_paused = true)]
async fn test_host_turns_respect_reversal_guard() {
    let (host, _handle) = GameHost::spawn(&test_config(), None, EventLogger::disabled());
    host.input(InputEvent::Confirm).unwrap();
    host.input(InputEvent::Turn(Direction::Up)).unwrap();
    wait_for(&host, |s| s.ticks >= 1).await;

    host.input(InputEvent::Turn(Direction::Down)).unwrap();
    host.input(InputEvent::ToggleMode).unwrap();
    let after = wait_for(&host, |s| s.sabotage).await;
    assert_eq!(after.direction, Direction::Up);
    assert_eq!(after.mode_text, "MODE: SABOTAGE");
}

#[tokio::test(start_paused = true)]
async fn test_host_loop_ends_when_handles_dropped() {
    let (host, handle) = GameHost::spawn(&test_config(), None, EventLogger::disabled());
    host.input(InputEvent::Confirm).unwrap();
    host.input(InputEvent::Turn(Direction::Up)).unwrap();
    wait_for(&host, |s| s.ticks >= 2).await;

    // The tick schedule is still live; it must not keep the loop running
    drop(host);
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("host loop should finish once every handle is gone")
        .expect("host loop should not panic");
}

#[tokio::test(start_paused = true)]
async fn test_host_loop_ends_from_menu() {
    let (host, handle) = GameHost::spawn(&test_config(), None, EventLogger::disabled());
    let extra = host.clone();
    drop(host);
    assert!(extra.input(InputEvent::Confirm).is_ok());
    drop(extra);

    timeout(Duration::from_secs(5), handle)
        .await
        .expect("host loop should finish once every handle is gone")
        .expect("host loop should not panic");
}
