//! Configuration types for batch play
//!
//! Level 4 - Utilities and configuration

use serde::{Deserialize, Serialize};

/// Batch configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Number of matches to play
    pub games: usize,
    /// Turn limit per match; matches still going at the limit count as draws
    pub max_turns: u32,
    /// Whether to run matches in parallel
    pub parallel: bool,
    /// Base random seed (None = use the match seed, or 42)
    pub seed: Option<u64>,
    /// Rotate seats between matches so each program plays every corner
    pub rotate_seats: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            games: 10,
            max_turns: 600,
            parallel: true,
            seed: None,
            rotate_seats: true,
        }
    }
}

impl ArenaConfig {
    /// Create config for the given number of matches
    pub fn new(games: usize) -> Self {
        Self {
            games,
            ..Default::default()
        }
    }

    /// Set turn limit
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Play matches one after another
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Keep every program in its configured seat
    pub fn fixed_seats(mut self) -> Self {
        self.rotate_seats = false;
        self
    }
}
