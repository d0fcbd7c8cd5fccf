// Core value types shared by the simulation, the controller and the host
//
// Positions live on an integer grid centred on the origin. Up is +y.

use serde::{Deserialize, Serialize};

/// One cell on the board
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        GridPosition { x, y }
    }

    /// True when the cell lies on or beyond the board edge for half-extent `b`
    pub fn is_outside(&self, b: i32) -> bool {
        self.x.abs() >= b || self.y.abs() >= b
    }
}

/// The four movement directions
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all possible directions
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Converts direction to its wire/string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Result<Direction, String> {
        match s.to_lowercase().as_str() {
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit vector as (dx, dy)
    pub fn unit(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Calculates the neighbouring cell when moving in this direction
    pub fn apply(&self, pos: &GridPosition) -> GridPosition {
        let (dx, dy) = self.unit();
        GridPosition {
            x: pos.x + dx,
            y: pos.y + dy,
        }
    }
}

/// Category of a point entity on the board
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Food,
    Obstacle,
    Wall,
    /// A body segment of the worm itself
    Segment,
}

impl ItemKind {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ItemKind::Food)
    }
}

/// Notifications for the audio/UI host. Fire-and-forget.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Eat,
    Crash,
    ModeSwitch,
}

/// Discrete key presses accepted from the input host
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Turn(Direction),
    ToggleMode,
    Confirm,
}

impl InputEvent {
    /// Maps a key name (as a browser or terminal would report it) to an input
    pub fn from_key(key: &str) -> Result<InputEvent, String> {
        match key.to_lowercase().as_str() {
            "arrowup" => Ok(InputEvent::Turn(Direction::Up)),
            "arrowdown" => Ok(InputEvent::Turn(Direction::Down)),
            "arrowleft" => Ok(InputEvent::Turn(Direction::Left)),
            "arrowright" => Ok(InputEvent::Turn(Direction::Right)),
            "space" | " " => Ok(InputEvent::ToggleMode),
            "r" | "enter" | "confirm" => Ok(InputEvent::Confirm),
            other => Direction::parse(other)
                .map(InputEvent::Turn)
                .map_err(|_| format!("Unknown key: {}", key)),
        }
    }
}

/// Everything the host loop feeds into the controller
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    Input { input: InputEvent },
    /// Periodic tick, stamped with the schedule generation that produced it
    Tick { generation: u64 },
    /// External overlay (trivia question) took over the screen
    Pause,
    Resume,
}

/// Game flow phases
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Menu,
    Ready,
    Running,
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Menu => "menu",
            GamePhase::Ready => "ready",
            GamePhase::Running => "running",
            GamePhase::GameOver => "game_over",
        }
    }
}
