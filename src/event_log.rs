// Event recording for replays
//
// Fire-and-forget async logging so the host loop is never blocked on disk. Every host
// event is written as one JSON line along with the session seed and the state the
// controller ended up in: phase, length and both scores. The seed is enough to re-drive
// the run later; the rest is what a replay is checked against.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::controller::Snapshot;
use crate::types::{GamePhase, HostEvent};

/// One recorded host event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub seq: u64,
    pub seed: u64,
    pub event: HostEvent,
    pub phase_after: GamePhase,
    pub chain_length: usize,
    pub own_score: i32,
    pub opposing_score: i32,
    pub timestamp: String,
}

impl EventLogEntry {
    /// Entry for `event`, taking the resulting state from `after`
    pub fn capture(seq: u64, seed: u64, event: HostEvent, after: &Snapshot) -> Self {
        EventLogEntry {
            seq,
            seed,
            event,
            phase_after: after.phase,
            chain_length: after.chain.len(),
            own_score: after.own_score,
            opposing_score: after.opposing_score,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Shared event logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct EventLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl EventLogger {
    /// Creates a new event logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Event logging enabled: {}", log_file_path);
                EventLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create event log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled logger (no-op)
    pub fn disabled() -> Self {
        EventLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs one event and the snapshot it produced, asynchronously (fire-and-forget)
    pub fn log_event(&self, seq: u64, seed: u64, event: HostEvent, after: &Snapshot) {
        if !self.enabled {
            return;
        }

        let entry = EventLogEntry::capture(seq, seed, event, after);
        let file_handle = self.file.clone();

        tokio::spawn(async move {
            Self::write_entry(file_handle, entry).await;
        });
    }

    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, entry: EventLogEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write event log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush event log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize event log entry: {}", e);
                }
            }
        }
    }
}
