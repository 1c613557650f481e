//! Game runner - executes single matches
//!
//! Level 3 - Step-level implementation

use hexbots_core::{ConfigError, Game, MatchConfig, MatchReport};
use serde::{Deserialize, Serialize};

/// Seating and seed for one match of a batch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    /// Position in the batch
    pub game_index: usize,
    /// Interpreter seed for this match
    pub seed: u64,
    /// Seat rotation: seat `s` is taken by configured player `(s + shift) % n`
    pub shift: usize,
}

impl GameSetup {
    /// Configured player sitting in `seat`
    pub fn player_at(&self, seat: usize, players: usize) -> usize {
        (seat + self.shift) % players
    }
}

/// Outcome of one match, attributed to configured players
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub setup: GameSetup,
    /// Report in seat terms
    pub report: MatchReport,
    /// Winning configured player (None for draw)
    pub winner: Option<usize>,
}

/// Seat the players for `setup` and play to the end or the turn limit
pub fn play_single_game(
    config: &MatchConfig,
    setup: GameSetup,
    max_turns: u32,
) -> Result<GameRecord, ConfigError> {
    config.validate()?;
    let n = config.players.len();

    let players = (0..n)
        .map(|seat| config.players[setup.player_at(seat, n)].clone())
        .collect();
    let seated = config.clone().with_players(players).with_seed(setup.seed);

    let mut game = Game::new(&seated)?;
    let report = game.run(max_turns);
    let winner = report.winner().map(|seat| setup.player_at(seat, n));

    tracing::debug!(
        "Game {} (shift {}): {:?} after {} turns",
        setup.game_index,
        setup.shift,
        report.result,
        report.turns
    );

    Ok(GameRecord { setup, report, winner })
}
