// Simulation step: moves the worm one cell and resolves whatever it lands on
//
// Classification order after the move is boundary, self, obstacle/wall, then food.
// Boundary, self and obstacle hits are terminal; food grows the worm, scores, may
// escalate difficulty, and respawns.

use log::info;
use serde::{Deserialize, Serialize};

use crate::chain::SegmentChain;
use crate::placement::{PlacementSampler, SessionRng};
use crate::score::ScoreState;
use crate::types::{Direction, GridPosition, ItemKind};

/// Rule constants for one game, derived from config
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub half_extent: i32,
    pub spawn_margin: i32,
    pub spawn_walls: bool,
    pub growth_amount: u32,
    pub food_points: i32,
    /// Spawn an extra obstacle every N food items; `None` disables escalation
    pub escalation_interval: Option<u32>,
    pub initial_obstacles: u32,
    pub initial_own_score: i32,
    pub initial_opposing_score: i32,
    pub sampler: PlacementSampler,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            half_extent: 12,
            spawn_margin: 2,
            spawn_walls: true,
            growth_amount: 2,
            food_points: 10,
            escalation_interval: Some(5),
            initial_obstacles: 1,
            initial_own_score: 0,
            initial_opposing_score: 150,
            sampler: PlacementSampler::default(),
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    Boundary,
    SelfHit,
    Obstacle,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Ate { escalated: bool },
    Crashed(CollisionKind),
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepOutcome::Crashed(_))
    }
}

/// Items placed on the board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    pub food: Option<GridPosition>,
    pub obstacles: Vec<GridPosition>,
    pub walls: Vec<GridPosition>,
}

impl Board {
    /// Perimeter ring at |x| == b or |y| == b
    pub fn perimeter(b: i32) -> Vec<GridPosition> {
        let mut walls = Vec::with_capacity((8 * b.max(0)) as usize);
        for x in -b..=b {
            walls.push(GridPosition::new(x, b));
            walls.push(GridPosition::new(x, -b));
        }
        for y in (-b + 1)..b {
            walls.push(GridPosition::new(b, y));
            walls.push(GridPosition::new(-b, y));
        }
        walls
    }

    pub fn blocks(&self, pos: &GridPosition) -> bool {
        self.obstacles.contains(pos) || self.walls.contains(pos)
    }
}

/// Everything the simulation mutates during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct World {
    pub chain: SegmentChain,
    pub board: Board,
    pub score: ScoreState,
    pub items_collected: u32,
}

impl World {
    /// One-cell worm at the origin on a board with nothing placed yet
    pub fn empty(rules: &Rules) -> Self {
        World {
            chain: SegmentChain::new(GridPosition::new(0, 0)),
            board: Board::default(),
            score: ScoreState::new(rules.initial_own_score, rules.initial_opposing_score),
            items_collected: 0,
        }
    }

    /// Fresh world: one-cell worm at the origin, food, starting obstacles and walls
    pub fn new(rules: &Rules, rng: &mut SessionRng) -> Self {
        let mut world = World::empty(rules);
        world.spawn_food(rules, rng);
        for _ in 0..rules.initial_obstacles {
            world.spawn_obstacle(rules, rng);
        }
        if rules.spawn_walls {
            world.board.walls = Board::perimeter(rules.half_extent);
        }
        world
    }

    /// Advances one tick in `direction` and resolves the landing cell
    pub fn step(
        &mut self,
        direction: Direction,
        rules: &Rules,
        rng: &mut SessionRng,
    ) -> StepOutcome {
        self.chain.advance(direction);
        let head = self.chain.head();

        if head.is_outside(rules.half_extent) {
            info!("Boundary collision at ({}, {})", head.x, head.y);
            return StepOutcome::Crashed(CollisionKind::Boundary);
        }

        match self.overlap_at(&head) {
            Some(kind) => self.resolve_overlap(kind, direction, rules, rng),
            None => StepOutcome::Moved,
        }
    }

    /// What the head would touch at `pos`, in collision priority order
    pub fn overlap_at(&self, pos: &GridPosition) -> Option<ItemKind> {
        if self.chain.body_hits(pos) {
            Some(ItemKind::Segment)
        } else if self.board.obstacles.contains(pos) {
            Some(ItemKind::Obstacle)
        } else if self.board.walls.contains(pos) {
            Some(ItemKind::Wall)
        } else if self.board.food.as_ref() == Some(pos) {
            Some(ItemKind::Food)
        } else {
            None
        }
    }

    /// Applies the effect of the head overlapping an item of `kind`
    pub fn resolve_overlap(
        &mut self,
        kind: ItemKind,
        direction: Direction,
        rules: &Rules,
        rng: &mut SessionRng,
    ) -> StepOutcome {
        match kind {
            ItemKind::Segment => {
                info!("Self collision at length {}", self.chain.len());
                StepOutcome::Crashed(CollisionKind::SelfHit)
            }
            ItemKind::Obstacle | ItemKind::Wall => {
                info!("{:?} collision", kind);
                StepOutcome::Crashed(CollisionKind::Obstacle)
            }
            ItemKind::Food => {
                let escalated = self.eat(direction, rules, rng);
                StepOutcome::Ate { escalated }
            }
        }
    }

    fn eat(&mut self, direction: Direction, rules: &Rules, rng: &mut SessionRng) -> bool {
        for _ in 0..rules.growth_amount {
            self.chain.append(direction);
        }
        self.board.food = None;
        self.items_collected += 1;
        self.score.record_food(rules.food_points);

        let escalated = match rules.escalation_interval {
            Some(n) if n > 0 => self.items_collected % n == 0,
            _ => false,
        };
        if escalated {
            info!(
                "Escalating: extra obstacle after {} items",
                self.items_collected
            );
            self.spawn_obstacle(rules, rng);
        }

        self.spawn_food(rules, rng);
        escalated
    }

    pub fn spawn_food(&mut self, rules: &Rules, rng: &mut SessionRng) {
        let pos = rules
            .sampler
            .sample(rules.half_extent, rules.spawn_margin, &self.chain, rng);
        self.board.food = Some(pos);
    }

    pub fn spawn_obstacle(&mut self, rules: &Rules, rng: &mut SessionRng) {
        let pos = rules
            .sampler
            .sample(rules.half_extent, rules.spawn_margin, &self.chain, rng);
        self.board.obstacles.push(pos);
    }
}
