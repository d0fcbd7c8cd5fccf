// Configuration module for reading Worm.toml
// Every tunable rule and host setting lives here; the simulation never reads files itself.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::controller::{ControllerSettings, RestartTarget, ReversalGuard};
use crate::placement::PlacementSampler;
use crate::simulation::Rules;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub board: BoardConfig,
    pub timing: TimingConfig,
    pub rules: RulesConfig,
    #[serde(default)]
    pub placement: PlacementSampler,
    pub session: SessionConfig,
    pub debug: DebugConfig,
    pub scores: ScoreSinkConfig,
}

/// Board geometry
#[derive(Debug, Deserialize, Clone)]
pub struct BoardConfig {
    /// Cells with |x| >= half_extent or |y| >= half_extent are out of bounds
    pub half_extent: i32,
    /// Spawns stay this many cells inside the edge
    pub spawn_margin: i32,
    pub spawn_walls: bool,
}

/// Tick timing
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub tick_interval_ms: u64,
}

impl TimingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Game rule constants
#[derive(Debug, Deserialize, Clone)]
pub struct RulesConfig {
    pub growth_amount: u32,
    pub food_points: i32,
    pub escalation_enabled: bool,
    pub escalation_interval: u32,
    pub initial_obstacles: u32,
    pub initial_own_score: i32,
    pub initial_opposing_score: i32,
    pub reversal_guard: ReversalGuard,
    pub restart_target: RestartTarget,
}

/// Per-session identity
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub team: String,
    /// Fixed RNG seed; a random one is drawn when absent
    pub seed: Option<u64>,
}

/// Event recording for replays
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

/// Final score persistence
#[derive(Debug, Deserialize, Clone)]
pub struct ScoreSinkConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Worm.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Worm.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Worm.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Worm.toml
    pub fn default_hardcoded() -> Self {
        Config {
            board: BoardConfig {
                half_extent: 12,
                spawn_margin: 2,
                spawn_walls: true,
            },
            timing: TimingConfig {
                tick_interval_ms: 150,
            },
            rules: RulesConfig {
                growth_amount: 2,
                food_points: 10,
                escalation_enabled: true,
                escalation_interval: 5,
                initial_obstacles: 1,
                initial_own_score: 0,
                initial_opposing_score: 150,
                reversal_guard: ReversalGuard::LastCommitted,
                restart_target: RestartTarget::Menu,
            },
            placement: PlacementSampler::default(),
            session: SessionConfig {
                team: "blue".to_string(),
                seed: None,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "worm_events.jsonl".to_string(),
            },
            scores: ScoreSinkConfig {
                enabled: true,
                log_file_path: "worm_scores.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load Worm.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }

    /// Simulation rules derived from the board, rules and placement sections
    pub fn game_rules(&self) -> Rules {
        Rules {
            half_extent: self.board.half_extent,
            spawn_margin: self.board.spawn_margin,
            spawn_walls: self.board.spawn_walls,
            growth_amount: self.rules.growth_amount,
            food_points: self.rules.food_points,
            escalation_interval: if self.rules.escalation_enabled {
                Some(self.rules.escalation_interval)
            } else {
                None
            },
            initial_obstacles: self.rules.initial_obstacles,
            initial_own_score: self.rules.initial_own_score,
            initial_opposing_score: self.rules.initial_opposing_score,
            sampler: self.placement,
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            tick_interval: self.timing.tick_interval(),
            reversal_guard: self.rules.reversal_guard,
            restart_target: self.rules.restart_target,
            team: self.session.team.clone(),
        }
    }
}
