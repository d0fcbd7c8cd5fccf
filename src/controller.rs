// Game flow controller
//
// Owns the world, the RNG and the tick schedule, and moves through
// Menu -> Ready -> Running -> GameOver. The host loop calls the lifecycle methods
// (on_init, on_tick, on_input, on_overlap) and reads snapshots; nothing here blocks.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::placement::SessionRng;
use crate::score_sink::{ScoreRecord, ScoreSink};
use crate::simulation::{CollisionKind, Rules, StepOutcome, World};
use crate::ticker::TickScheduler;
use crate::types::{Cue, Direction, GamePhase, GridPosition, HostEvent, InputEvent, ItemKind};

/// What a turn request is checked against to forbid reversing into the neck
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReversalGuard {
    /// The direction of the last tick actually moved. Two quick turns within one tick
    /// cannot add up to a reversal.
    LastCommitted,
    /// The queued direction. Two quick turns can reverse the worm onto itself.
    Pending,
}

/// Where confirm leads from GameOver
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RestartTarget {
    Menu,
    Running,
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub tick_interval: Duration,
    pub reversal_guard: ReversalGuard,
    pub restart_target: RestartTarget,
    pub team: String,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        ControllerSettings {
            tick_interval: Duration::from_millis(150),
            reversal_guard: ReversalGuard::LastCommitted,
            restart_target: RestartTarget::Menu,
            team: "blue".to_string(),
        }
    }
}

/// Read-only view for the rendering host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub session_id: String,
    pub run: u32,
    pub phase: GamePhase,
    pub paused: bool,
    pub direction: Direction,
    pub chain: Vec<GridPosition>,
    pub food: Option<GridPosition>,
    pub obstacles: Vec<GridPosition>,
    pub walls: Vec<GridPosition>,
    pub own_score: i32,
    pub opposing_score: i32,
    pub sabotage: bool,
    pub score_text: String,
    pub mode_text: String,
    pub items_collected: u32,
    pub ticks: u64,
    pub last_collision: Option<CollisionKind>,
    /// Cues raised by the most recent event, filled in by the host loop
    pub cues: Vec<Cue>,
}

pub struct GameController<S: TickScheduler> {
    rules: Rules,
    settings: ControllerSettings,
    scheduler: S,
    rng: SessionRng,
    session_id: String,
    sink: Option<Arc<dyn ScoreSink>>,

    phase: GamePhase,
    world: World,
    direction: Direction,
    last_moved: Direction,
    paused: bool,
    generation: u64,
    ticks: u64,
    run: u32,
    reported: bool,
    last_collision: Option<CollisionKind>,
    cues: Vec<Cue>,
}

impl<S: TickScheduler> GameController<S> {
    pub fn new(rules: Rules, settings: ControllerSettings, rng: SessionRng, scheduler: S) -> Self {
        // Laid out by on_init
        let world = World::empty(&rules);
        let session_id = new_session_id();
        let mut controller = GameController {
            rules,
            settings,
            scheduler,
            rng,
            session_id,
            sink: None,
            phase: GamePhase::Menu,
            world,
            direction: Direction::Right,
            last_moved: Direction::Right,
            paused: false,
            generation: 0,
            ticks: 0,
            run: 0,
            reported: false,
            last_collision: None,
            cues: Vec::new(),
        };
        controller.on_init();
        controller
    }

    /// Builds a controller from config, seeding the RNG from `session.seed` if set
    pub fn from_config(config: &Config, scheduler: S) -> Self {
        let rng = match config.session.seed {
            Some(seed) => SessionRng::new(seed),
            None => SessionRng::from_random(),
        };
        Self::new(
            config.game_rules(),
            config.controller_settings(),
            rng,
            scheduler,
        )
    }

    pub fn with_score_sink(mut self, sink: Arc<dyn ScoreSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Generation stamped on ticks from the live schedule
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Puts the controller on the start menu with no tick scheduled and a freshly laid
    /// out board. That board is the one played after confirm.
    pub fn on_init(&mut self) {
        self.stop_ticking();
        self.world = World::new(&self.rules, &mut self.rng);
        self.phase = GamePhase::Menu;
        self.paused = false;
        info!("Session {}: waiting at menu", self.session_id);
    }

    /// Dispatches one host event
    pub fn handle_event(&mut self, event: HostEvent) -> Option<StepOutcome> {
        match event {
            HostEvent::Input { input } => {
                self.on_input(input);
                None
            }
            HostEvent::Tick { generation } => self.on_tick(generation),
            HostEvent::Pause => {
                self.pause();
                None
            }
            HostEvent::Resume => {
                self.resume();
                None
            }
        }
    }

    pub fn on_input(&mut self, input: InputEvent) {
        match (self.phase, input) {
            (GamePhase::Menu, InputEvent::Confirm) => {
                self.begin_run();
                self.phase = GamePhase::Ready;
                self.cues.push(Cue::ModeSwitch);
                info!("Run {} ready, waiting for first move", self.run);
            }
            (GamePhase::GameOver, InputEvent::Confirm) => self.restart(),
            (GamePhase::Ready, InputEvent::Turn(direction)) => {
                self.phase = GamePhase::Running;
                self.start_ticking();
                self.turn(direction);
                info!("Run {} started", self.run);
            }
            (GamePhase::Running, InputEvent::Turn(direction)) => {
                self.turn(direction);
            }
            (GamePhase::Ready, InputEvent::ToggleMode)
            | (GamePhase::Running, InputEvent::ToggleMode) => {
                let sabotage = self.world.score.toggle_mode();
                self.cues.push(Cue::ModeSwitch);
                info!("Sabotage mode {}", if sabotage { "on" } else { "off" });
            }
            (phase, input) => {
                debug!("Ignoring {:?} in {:?}", input, phase);
            }
        }
    }

    /// One periodic tick. Returns `None` when the tick is ignored: wrong phase, paused,
    /// or stamped by a cancelled schedule.
    pub fn on_tick(&mut self, generation: u64) -> Option<StepOutcome> {
        if self.phase != GamePhase::Running || self.paused {
            return None;
        }
        if generation != self.generation {
            debug!(
                "Dropping stale tick from schedule {} (live: {})",
                generation, self.generation
            );
            return None;
        }

        let outcome = self
            .world
            .step(self.direction, &self.rules, &mut self.rng);
        self.last_moved = self.direction;
        self.ticks += 1;
        self.apply_outcome(outcome);
        Some(outcome)
    }

    /// Collision hook for hosts that run their own overlap detection. Applies the same
    /// effect the tick would for an item of `kind` under the head.
    pub fn on_overlap(&mut self, kind: ItemKind) -> Option<StepOutcome> {
        if self.phase != GamePhase::Running || self.paused {
            return None;
        }
        let outcome =
            self.world
                .resolve_overlap(kind, self.direction, &self.rules, &mut self.rng);
        self.apply_outcome(outcome);
        Some(outcome)
    }

    /// Freezes tick progress while an external overlay is shown
    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Running || self.paused {
            return false;
        }
        self.paused = true;
        info!("Paused by overlay");
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        info!("Resumed");
        true
    }

    /// Takes the cues raised since the last call
    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn snapshot(&self) -> Snapshot {
        let score = &self.world.score;
        Snapshot {
            session_id: self.session_id.clone(),
            run: self.run,
            phase: self.phase,
            paused: self.paused,
            direction: self.direction,
            chain: self.world.chain.segments().to_vec(),
            food: self.world.board.food,
            obstacles: self.world.board.obstacles.clone(),
            walls: self.world.board.walls.clone(),
            own_score: score.own(),
            opposing_score: score.opposing(),
            sabotage: score.is_sabotage(),
            score_text: score.score_label(),
            mode_text: score.mode_label().to_string(),
            items_collected: self.world.items_collected,
            ticks: self.ticks,
            last_collision: self.last_collision,
            cues: Vec::new(),
        }
    }

    /// Queues a turn unless it reverses the worm. Returns whether it was accepted.
    fn turn(&mut self, requested: Direction) -> bool {
        let reference = match self.settings.reversal_guard {
            ReversalGuard::LastCommitted => self.last_moved,
            ReversalGuard::Pending => self.direction,
        };
        if requested == reference.opposite() {
            debug!("Rejecting reversal {:?} -> {:?}", reference, requested);
            return false;
        }
        self.direction = requested;
        true
    }

    fn apply_outcome(&mut self, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Moved => {}
            StepOutcome::Ate { .. } => self.cues.push(Cue::Eat),
            StepOutcome::Crashed(kind) => self.game_over(kind),
        }
    }

    fn game_over(&mut self, kind: CollisionKind) {
        self.stop_ticking();
        self.phase = GamePhase::GameOver;
        self.paused = false;
        self.last_collision = Some(kind);
        self.cues.push(Cue::Crash);
        info!(
            "Run {} over ({:?}): {} after {} ticks",
            self.run,
            kind,
            self.world.score.score_label(),
            self.ticks
        );
        self.report_score(kind);
    }

    fn report_score(&mut self, reason: CollisionKind) {
        if self.reported {
            return;
        }
        self.reported = true;

        if let Some(sink) = &self.sink {
            sink.submit(ScoreRecord {
                session_id: self.session_id.clone(),
                run: self.run,
                team: self.settings.team.clone(),
                own_score: self.world.score.own(),
                opposing_score: self.world.score.opposing(),
                items_collected: self.world.items_collected,
                length: self.world.chain.len(),
                reason,
                timestamp: chrono::Utc::now().to_rfc3339(),
            });
        }
    }

    fn restart(&mut self) {
        match self.settings.restart_target {
            RestartTarget::Menu => self.on_init(),
            RestartTarget::Running => {
                self.world = World::new(&self.rules, &mut self.rng);
                self.begin_run();
                self.phase = GamePhase::Running;
                self.start_ticking();
                info!("Run {} restarted", self.run);
            }
        }
    }

    /// Resets per-run state around the current world
    fn begin_run(&mut self) {
        self.stop_ticking();
        self.direction = Direction::Right;
        self.last_moved = Direction::Right;
        self.paused = false;
        self.ticks = 0;
        self.run += 1;
        self.reported = false;
        self.last_collision = None;
    }

    fn start_ticking(&mut self) {
        if self.scheduler.is_active() {
            self.scheduler.cancel();
        }
        self.generation += 1;
        self.scheduler
            .start(self.settings.tick_interval, self.generation);
    }

    fn stop_ticking(&mut self) {
        if self.scheduler.is_active() {
            self.scheduler.cancel();
            // Anything the old schedule already queued is now stale
            self.generation += 1;
        }
    }
}

fn new_session_id() -> String {
    use rand::Rng;
    format!("{:016x}", rand::rng().random::<u64>())
}
