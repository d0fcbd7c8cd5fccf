// Scoreboard for the two competing teams and the sabotage toggle

use serde::Serialize;

/// Own and opposing scores plus the sabotage flag.
///
/// In sabotage mode a food pickup costs the opposing team points instead of earning
/// points for the own team. The opposing score may go negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreState {
    own: i32,
    opposing: i32,
    sabotage: bool,
}

impl ScoreState {
    pub fn new(own: i32, opposing: i32) -> Self {
        ScoreState {
            own,
            opposing,
            sabotage: false,
        }
    }

    pub fn own(&self) -> i32 {
        self.own
    }

    pub fn opposing(&self) -> i32 {
        self.opposing
    }

    pub fn is_sabotage(&self) -> bool {
        self.sabotage
    }

    /// Flips sabotage mode and returns the new value
    pub fn toggle_mode(&mut self) -> bool {
        self.sabotage = !self.sabotage;
        self.sabotage
    }

    /// Applies one food pickup worth `points`
    pub fn record_food(&mut self, points: i32) {
        if self.sabotage {
            self.opposing -= points;
        } else {
            self.own += points;
        }
    }

    pub fn mode_label(&self) -> &'static str {
        if self.sabotage {
            "MODE: SABOTAGE"
        } else {
            "MODE: SECURE"
        }
    }

    pub fn score_label(&self) -> String {
        format!("BLUE: {} | RED: {}", self.own, self.opposing)
    }
}
