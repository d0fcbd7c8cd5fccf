// Integration tests for the replay binary
//
// Tests the replay binary CLI behavior:
// - Command-line argument parsing and usage output
// - Error exit codes for missing files and bad options
// - --strict exit code when a log does not match its replay

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use cyber_worm::config::Config;
use cyber_worm::controller::GameController;
use cyber_worm::event_log::EventLogEntry;
use cyber_worm::placement::SessionRng;
use cyber_worm::ticker::ManualTicker;
use cyber_worm::types::{Direction, GamePhase, HostEvent, InputEvent};

const SEED: u64 = 515;

/// Path to the Worm.toml shipped with the crate
fn worm_toml() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("Worm.toml")
        .to_string_lossy()
        .into_owned()
}

/// Helper to run replay binary with arguments
fn run_replay(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_replay"))
        .args(args)
        .output()
        .expect("Failed to execute replay binary")
}

/// Runs a worm straight up under the shipped config until the run ends
fn record_session() -> Vec<EventLogEntry> {
    let config = Config::from_file(worm_toml()).expect("Worm.toml should load");
    let mut controller = GameController::new(
        config.game_rules(),
        config.controller_settings(),
        SessionRng::new(SEED),
        ManualTicker::new(),
    );
    let mut entries = Vec::new();
    let mut apply = |controller: &mut GameController<ManualTicker>, event: HostEvent| {
        controller.handle_event(event);
        let seq = entries.len() as u64;
        entries.push(EventLogEntry::capture(seq, SEED, event, &controller.snapshot()));
    };

    apply(
        &mut controller,
        HostEvent::Input {
            input: InputEvent::Confirm,
        },
    );
    apply(
        &mut controller,
        HostEvent::Input {
            input: InputEvent::Turn(Direction::Up),
        },
    );
    while controller.phase() == GamePhase::Running {
        let tick = controller
            .scheduler()
            .next_tick()
            .expect("running controller has a live schedule");
        apply(&mut controller, tick);
    }
    entries
}

fn write_log(entries: &[EventLogEntry], name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}_{}.jsonl", name, std::process::id()));
    let mut file = std::fs::File::create(&path).expect("create temp log");
    for entry in entries {
        writeln!(file, "{}", serde_json::to_string(entry).unwrap()).unwrap();
    }
    path
}

#[test]
fn test_replay_help() {
    let output = run_replay(&["--help"]);
    assert!(output.status.success(), "Help command should succeed");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("USAGE"), "Should print usage");
    assert!(stderr.contains("--strict"), "Should document --strict");
}

#[test]
fn test_replay_no_args() {
    let output = run_replay(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("USAGE"));
}

#[test]
fn test_replay_missing_file() {
    let output = run_replay(&["/nonexistent/worm_events.jsonl", "--config", &worm_toml()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to open log file"));
}

#[test]
fn test_replay_unknown_option() {
    let path = write_log(&record_session(), "worm_cli_unknown_option");
    let output = run_replay(&[path.to_str().unwrap(), "--fast"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown option '--fast'"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_replay_config_requires_value() {
    let path = write_log(&record_session(), "worm_cli_config_value");
    let output = run_replay(&[path.to_str().unwrap(), "--config"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--config requires an argument"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_replay_matching_log_strict() {
    let path = write_log(&record_session(), "worm_cli_matching");
    let output = run_replay(&[path.to_str().unwrap(), "--config", &worm_toml(), "--strict"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {}", stdout);
    assert!(stdout.contains("=== REPLAY REPORT ==="));
    assert!(stdout.contains("Replay matches the recording"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_replay_divergent_log_exit_codes() {
    let mut entries = record_session();
    let last = entries.len() - 1;
    entries[last].chain_length += 4;
    let path = write_log(&entries, "worm_cli_divergent");
    let log = path.to_str().unwrap();

    // Without --strict the report is printed and the run still succeeds
    let output = run_replay(&[log, "--config", &worm_toml()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("1 divergence(s)"));

    let output = run_replay(&[log, "--config", &worm_toml(), "--strict"]);
    assert_eq!(output.status.code(), Some(2));

    let _ = std::fs::remove_file(&path);
}
