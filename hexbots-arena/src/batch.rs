//! Batch play - many matches between the same programs
//!
//! Level 1 - Orchestration and Level 2 - Phases

use hexbots_core::{ConfigError, MatchConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;
use crate::game_runner::{play_single_game, GameRecord, GameSetup};

/// Aggregate result of a batch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Match config name
    pub name: String,
    /// Total matches played
    pub games_played: u32,
    /// Wins per configured player
    pub wins: Vec<u32>,
    /// Draws, including matches stopped at the turn limit
    pub draws: u32,
    /// Average match length in turns
    pub avg_turns: f32,
    /// Average match length in rounds
    pub avg_rounds: f32,
    /// Script diagnostics across all matches
    pub script_errors: usize,
    /// Individual match records
    pub records: Vec<GameRecord>,
}

impl BatchSummary {
    /// Create empty result
    pub fn empty(name: &str, players: usize) -> Self {
        Self {
            name: name.to_string(),
            games_played: 0,
            wins: vec![0; players],
            draws: 0,
            avg_turns: 0.0,
            avg_rounds: 0.0,
            script_errors: 0,
            records: Vec::new(),
        }
    }

    /// Win rate for a configured player
    pub fn win_rate(&self, player: usize) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            self.wins.get(player).copied().unwrap_or(0) as f32 / self.games_played as f32
        }
    }

    /// Get draw rate
    pub fn draw_rate(&self) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            self.draws as f32 / self.games_played as f32
        }
    }

    /// Wins = 1.0, Draws = 0.5, Losses = 0.0
    pub fn score_for(&self, player: usize) -> f32 {
        self.wins.get(player).copied().unwrap_or(0) as f32 + 0.5 * self.draws as f32
    }

    /// Player with the most wins, if anyone won at all
    pub fn leader(&self) -> Option<usize> {
        let (player, &wins) = self
            .wins
            .iter()
            .enumerate()
            .max_by_key(|&(i, w)| (*w, std::cmp::Reverse(i)))?;
        (wins > 0).then_some(player)
    }
}

/// Play a batch of matches (Level 1 orchestration)
pub fn run_batch(config: &MatchConfig, arena: &ArenaConfig) -> Result<BatchSummary, ConfigError> {
    config.validate()?;
    if arena.games == 0 {
        return Ok(BatchSummary::empty(&config.name, config.players.len()));
    }

    tracing::info!(
        "Running {} matches of '{}' ({})",
        arena.games,
        config.name,
        if arena.parallel { "parallel" } else { "sequential" }
    );

    let setups = prepare_games(config, arena);
    let records = if arena.parallel {
        execute_games_parallel(config, &setups, arena.max_turns)?
    } else {
        execute_games(config, &setups, arena.max_turns)?
    };
    Ok(aggregate_results(config, records))
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Seeds and seat rotations for every match
fn prepare_games(config: &MatchConfig, arena: &ArenaConfig) -> Vec<GameSetup> {
    let base_seed = arena.seed.or(config.seed).unwrap_or(42);
    let players = config.players.len();

    (0..arena.games)
        .map(|i| GameSetup {
            game_index: i,
            seed: base_seed.wrapping_add(i as u64),
            shift: if arena.rotate_seats { i % players } else { 0 },
        })
        .collect()
}

/// Execute matches sequentially
fn execute_games(
    config: &MatchConfig,
    setups: &[GameSetup],
    max_turns: u32,
) -> Result<Vec<GameRecord>, ConfigError> {
    setups
        .iter()
        .map(|&setup| play_single_game(config, setup, max_turns))
        .collect()
}

/// Execute matches in parallel using rayon
fn execute_games_parallel(
    config: &MatchConfig,
    setups: &[GameSetup],
    max_turns: u32,
) -> Result<Vec<GameRecord>, ConfigError> {
    setups
        .par_iter()
        .map(|&setup| play_single_game(config, setup, max_turns))
        .collect()
}

/// Aggregate match records into a summary
fn aggregate_results(config: &MatchConfig, records: Vec<GameRecord>) -> BatchSummary {
    let mut summary = BatchSummary::empty(&config.name, config.players.len());
    let mut total_turns = 0u64;
    let mut total_rounds = 0u64;

    for record in &records {
        total_turns += u64::from(record.report.turns);
        total_rounds += u64::from(record.report.rounds);
        summary.script_errors += record.report.script_errors;

        match record.winner {
            Some(player) => summary.wins[player] += 1,
            None => summary.draws += 1,
        }
    }

    let games = records.len();
    summary.games_played = games as u32;
    if games > 0 {
        summary.avg_turns = total_turns as f32 / games as f32;
        summary.avg_rounds = total_rounds as f32 / games as f32;
    }
    summary.records = records;
    summary
}
