// Final-score persistence
//
// When a run ends the controller hands one ScoreRecord to a ScoreSink. Delivery is
// best-effort: writes happen on a spawned task and failures are only logged. Each
// (session, run) pair is accepted at most once.

use log::{error, info, warn};
use parking_lot::Mutex as SyncMutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::simulation::CollisionKind;

/// Outcome of one finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub session_id: String,
    pub run: u32,
    pub team: String,
    pub own_score: i32,
    pub opposing_score: i32,
    pub items_collected: u32,
    pub length: usize,
    pub reason: CollisionKind,
    pub timestamp: String,
}

/// Destination for finished-run records
pub trait ScoreSink: Send + Sync {
    fn submit(&self, record: ScoreRecord);
}

/// Appends records as JSON lines to a file
#[derive(Clone)]
pub struct JsonlScoreSink {
    file: Arc<Mutex<Option<File>>>,
    submitted: Arc<SyncMutex<HashSet<(String, u32)>>>,
    enabled: bool,
}

impl JsonlScoreSink {
    /// Opens (or creates) the score file in append mode
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                info!("Score log: {}", log_file_path);
                JsonlScoreSink {
                    file: Arc::new(Mutex::new(Some(file))),
                    submitted: Arc::new(SyncMutex::new(HashSet::new())),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to open score log '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled sink (no-op)
    pub fn disabled() -> Self {
        JsonlScoreSink {
            file: Arc::new(Mutex::new(None)),
            submitted: Arc::new(SyncMutex::new(HashSet::new())),
            enabled: false,
        }
    }

    /// Marks the record's key as taken; false if it was already submitted
    fn claim(&self, record: &ScoreRecord) -> bool {
        self.submitted
            .lock()
            .insert((record.session_id.clone(), record.run))
    }

    async fn write_record(file_handle: Arc<Mutex<Option<File>>>, record: ScoreRecord) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&record) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write score record: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush score log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize score record: {}", e);
                }
            }
        }
    }
}

impl ScoreSink for JsonlScoreSink {
    fn submit(&self, record: ScoreRecord) {
        if !self.enabled {
            return;
        }
        if !self.claim(&record) {
            warn!(
                "Score for session {} run {} already submitted, dropping",
                record.session_id, record.run
            );
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                error!("No async runtime available, score record dropped");
                return;
            }
        };

        let file_handle = self.file.clone();
        runtime.spawn(async move {
            Self::write_record(file_handle, record).await;
        });
    }
}
