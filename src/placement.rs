// Spawn placement for food and obstacles
//
// Candidates are drawn uniformly from the interior square [-B+margin, B-margin] on each
// axis. The checked strategy rejects cells under the worm and retries a bounded number
// of times; once the attempts are used up it returns the last candidate anyway, so a
// crowded board degrades to a possibly-overlapping spawn instead of stalling the game.

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::chain::SegmentChain;
use crate::types::GridPosition;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

/// Seeded RNG for one game session, so a run can be reproduced from its seed
#[derive(Debug, Clone)]
pub struct SessionRng {
    rng: StdRng,
    seed: u64,
}

impl SessionRng {
    pub fn new(seed: u64) -> Self {
        SessionRng {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn from_random() -> Self {
        let seed: u64 = rand::rng().random();
        Self::new(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in the inclusive range [lo, hi]
    pub fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        self.rng.random_range(lo..=hi)
    }
}

/// Placement strategy selected in config
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum PlacementSampler {
    /// Rejection sampling against the chain, bounded by `max_attempts`
    Checked {
        #[serde(default = "default_max_attempts")]
        max_attempts: u32,
    },
    /// First draw wins. Constant time; fine for sparse boards.
    Unchecked,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for PlacementSampler {
    fn default() -> Self {
        PlacementSampler::Checked {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PlacementSampler {
    /// Picks a spawn cell for a board of half-extent `half_extent`
    pub fn sample(
        &self,
        half_extent: i32,
        margin: i32,
        chain: &SegmentChain,
        rng: &mut SessionRng,
    ) -> GridPosition {
        match *self {
            PlacementSampler::Unchecked => Self::random_cell(half_extent, margin, rng),
            PlacementSampler::Checked { max_attempts } => {
                let mut candidate = Self::random_cell(half_extent, margin, rng);
                let mut attempts = 1;
                while chain.contains(&candidate) {
                    if attempts >= max_attempts {
                        warn!(
                            "Placement gave up after {} attempts, spawning at occupied cell ({}, {})",
                            attempts, candidate.x, candidate.y
                        );
                        break;
                    }
                    candidate = Self::random_cell(half_extent, margin, rng);
                    attempts += 1;
                }
                candidate
            }
        }
    }

    fn random_cell(half_extent: i32, margin: i32, rng: &mut SessionRng) -> GridPosition {
        let lo = -half_extent + margin;
        let hi = half_extent - margin;
        // Degenerate boards collapse onto the centre
        if lo > hi {
            return GridPosition::new(0, 0);
        }
        GridPosition::new(rng.range_inclusive(lo, hi), rng.range_inclusive(lo, hi))
    }
}
