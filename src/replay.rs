// Replay module for re-driving recorded sessions
//
// This module provides functionality to:
// 1. Parse JSONL event logs
// 2. Re-run the recorded events through a fresh controller with the recorded seed
// 3. Compare the phase, length and scores reached after each event with what was recorded
// 4. Summarize the final state of the run

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::Config;
use crate::controller::GameController;
use crate::event_log::EventLogEntry;
use crate::placement::SessionRng;
use crate::ticker::{ManualTicker, TickScheduler};
use crate::types::{GamePhase, HostEvent};

/// State compared after every replayed event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub phase: GamePhase,
    pub chain_length: usize,
    pub own_score: i32,
    pub opposing_score: i32,
}

impl Checkpoint {
    fn recorded(entry: &EventLogEntry) -> Self {
        Checkpoint {
            phase: entry.phase_after,
            chain_length: entry.chain_length,
            own_score: entry.own_score,
            opposing_score: entry.opposing_score,
        }
    }

    fn replayed<S: TickScheduler>(controller: &GameController<S>) -> Self {
        let world = controller.world();
        Checkpoint {
            phase: controller.phase(),
            chain_length: world.chain.len(),
            own_score: world.score.own(),
            opposing_score: world.score.opposing(),
        }
    }
}

/// Event after which the replayed state differs from the recorded one
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    pub seq: u64,
    pub event: HostEvent,
    pub recorded: Checkpoint,
    pub replayed: Checkpoint,
}

/// Statistics for a complete replay session
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayStats {
    pub seed: u64,
    pub total_events: usize,
    pub ticks_applied: usize,
    pub final_phase: GamePhase,
    pub own_score: i32,
    pub opposing_score: i32,
    pub items_collected: u32,
    pub chain_length: usize,
    pub divergences: Vec<Divergence>,
}

impl ReplayStats {
    pub fn matches(&self) -> bool {
        self.divergences.is_empty()
    }
}

/// Replay engine for recorded event logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration.
    /// The config must carry the same rules the session was recorded with.
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine { config, verbose }
    }

    /// Loads all entries from a JSONL file, ordered by sequence number
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<EventLogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: EventLogEntry = serde_json::from_str(&line).map_err(|e| {
                format!("Failed to parse JSON on line {}: {}", line_num + 1, e)
            })?;

            entries.push(entry);
        }

        // Writes are async, so lines may land slightly out of order
        entries.sort_by_key(|e| e.seq);

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Re-drives a fresh controller through `entries`
    pub fn replay(&self, entries: &[EventLogEntry]) -> Result<ReplayStats, String> {
        let first = entries
            .first()
            .ok_or_else(|| "Event log is empty".to_string())?;
        let seed = first.seed;
        if let Some(other) = entries.iter().find(|e| e.seed != seed) {
            return Err(format!(
                "Log mixes sessions: seed {} at seq {} differs from {}",
                other.seed, other.seq, seed
            ));
        }

        let mut controller = GameController::new(
            self.config.game_rules(),
            self.config.controller_settings(),
            SessionRng::new(seed),
            ManualTicker::new(),
        );

        let mut ticks_applied = 0;
        let mut divergences = Vec::new();

        for entry in entries {
            if controller.handle_event(entry.event).is_some() {
                ticks_applied += 1;
            }

            let recorded = Checkpoint::recorded(entry);
            let replayed = Checkpoint::replayed(&controller);
            if replayed != recorded {
                warn!(
                    "Divergence at seq {}: recorded {:?}, replayed {:?}",
                    entry.seq, recorded, replayed
                );
                divergences.push(Divergence {
                    seq: entry.seq,
                    event: entry.event,
                    recorded,
                    replayed,
                });
            } else if self.verbose {
                info!(
                    "seq {}: {:?} -> {:?} (length {})",
                    entry.seq, entry.event, replayed.phase, replayed.chain_length
                );
            }
        }

        let world = controller.world();
        Ok(ReplayStats {
            seed,
            total_events: entries.len(),
            ticks_applied,
            final_phase: controller.phase(),
            own_score: world.score.own(),
            opposing_score: world.score.opposing(),
            items_collected: world.items_collected,
            chain_length: world.chain.len(),
            divergences,
        })
    }

    /// Loads and replays a log file in one go
    pub fn replay_file<P: AsRef<Path>>(&self, log_path: P) -> Result<ReplayStats, String> {
        let entries = self.load_log_file(log_path)?;
        self.replay(&entries)
    }

    /// Prints a human-readable summary of a replay
    pub fn print_report(&self, stats: &ReplayStats) {
        println!("=== REPLAY REPORT ===");
        println!("Seed:            {}", stats.seed);
        println!("Events:          {}", stats.total_events);
        println!("Ticks applied:   {}", stats.ticks_applied);
        println!("Final phase:     {}", stats.final_phase.as_str());
        println!(
            "Score:           BLUE: {} | RED: {}",
            stats.own_score, stats.opposing_score
        );
        println!("Items collected: {}", stats.items_collected);
        println!("Chain length:    {}", stats.chain_length);
        println!();

        if stats.matches() {
            println!("Replay matches the recording");
        } else {
            println!("{} divergence(s):", stats.divergences.len());
            for d in &stats.divergences {
                println!(
                    "  seq {:>5}: {:?} recorded {} len {} ({}/{}) replayed {} len {} ({}/{})",
                    d.seq,
                    d.event,
                    d.recorded.phase.as_str(),
                    d.recorded.chain_length,
                    d.recorded.own_score,
                    d.recorded.opposing_score,
                    d.replayed.phase.as_str(),
                    d.replayed.chain_length,
                    d.replayed.own_score,
                    d.replayed.opposing_score
                );
            }
        }
    }
}
