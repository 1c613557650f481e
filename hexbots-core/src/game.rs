//! Match orchestration: setup from config, AI turns and full runs

use serde::{Deserialize, Serialize};

use crate::board::{Board, GameResult};
use crate::config::MatchConfig;
use crate::error::ConfigError;
use crate::piece::Piece;
use crate::script::{Interpreter, TurnContext};
use crate::team::{Team, TEAM_COLORS};

// ============================================================================
// MATCH REPORT
// ============================================================================

/// Summary of a finished (or turn-limited) match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    pub name: String,
    pub result: GameResult,
    /// Turns played
    pub turns: u32,
    /// Round the match ended in
    pub rounds: u32,
    /// Living pieces per team
    pub survivors: Vec<usize>,
    /// Script diagnostics recorded across all interpreters
    pub script_errors: usize,
}

impl MatchReport {
    /// Winning team, if any
    pub fn winner(&self) -> Option<usize> {
        match self.result {
            GameResult::Won(team) => Some(team),
            _ => None,
        }
    }

    /// Draw, or still going when the turn limit hit
    pub fn is_draw(&self) -> bool {
        self.winner().is_none()
    }
}

// ============================================================================
// GAME
// ============================================================================

/// A match in progress
#[derive(Debug)]
pub struct Game {
    name: String,
    board: Board,
    result: GameResult,
    turns: u32,
}

impl Game {
    /// Validate the config, seat the teams and initialize every script
    pub fn new(config: &MatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let kinds = config.pieces.kinds();
        let base_seed = config.seed.unwrap_or_else(rand::random);
        let teams = config
            .players
            .iter()
            .zip(TEAM_COLORS)
            .enumerate()
            .map(|(t, (player, color))| {
                let pieces = kinds.iter().map(|&k| Piece::new(k, 0)).collect();
                if !player.ai {
                    return Team::human(color, pieces);
                }
                let interpreters = (0..kinds.len())
                    .map(|local| {
                        let offset = t * kinds.len() + local;
                        Interpreter::new(offset, player.program_for(local).to_vec())
                            .with_limits(config.limits)
                            .with_seed(base_seed.wrapping_add(offset as u64))
                    })
                    .collect();
                Team::robot(color, pieces, interpreters)
            })
            .collect();

        let board = Board::new(config.side_length, teams)?;
        let mut game = Self {
            name: config.name.clone(),
            board,
            result: GameResult::Ongoing,
            turns: 0,
        };
        tracing::info!(
            "Match '{}': {} players, side {}, {} pieces each",
            game.name,
            game.board.team_count(),
            game.board.side(),
            game.board.pieces_per_team()
        );
        game.init_ai();
        Ok(game)
    }

    /// Run each interpreter's program once. Called by [`Game::new`].
    pub fn init_ai(&mut self) {
        for offset in 0..self.board.piece_count() {
            self.with_interpreter(offset, |vm, ctx| vm.initialize(ctx));
        }
    }

    /// Run the current piece's `play` word once.
    /// Returns false for human pieces and finished matches.
    pub fn play_ai(&mut self) -> bool {
        if self.result != GameResult::Ongoing {
            return false;
        }
        let current = self.board.current();
        if !self.board.piece(current).alive {
            return false;
        }
        self.with_interpreter(current, |vm, ctx| vm.play(ctx))
    }

    /// Finish the current turn and pass play to the next living piece
    pub fn end_turn(&mut self) -> GameResult {
        if self.result != GameResult::Ongoing {
            return self.result;
        }
        self.turns += 1;
        self.result = self.board.advance();
        if self.result != GameResult::Ongoing {
            tracing::info!(
                "Match '{}' finished after {} turns: {:?}",
                self.name,
                self.turns,
                self.result
            );
        }
        self.result
    }

    /// AI move (if any) followed by the turn advance
    pub fn play_turn(&mut self) -> GameResult {
        self.play_ai();
        self.end_turn()
    }

    /// Play until the match ends or `max_turns` turns have passed.
    /// Human pieces pass their turns.
    pub fn run(&mut self, max_turns: u32) -> MatchReport {
        while self.result == GameResult::Ongoing && self.turns < max_turns {
            self.play_turn();
        }
        if self.result == GameResult::Ongoing {
            tracing::info!("Match '{}' stopped at the {} turn limit", self.name, max_turns);
        }
        self.report()
    }

    pub fn report(&self) -> MatchReport {
        MatchReport {
            name: self.name.clone(),
            result: self.result,
            turns: self.turns,
            rounds: self.board.round(),
            survivors: self.board.teams().iter().map(Team::living).collect(),
            script_errors: self.interpreters().map(|vm| vm.diagnostics().len()).sum(),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for human moves
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn current_is_ai(&self) -> bool {
        let team = self.board.team_of(self.board.current());
        self.board.team(team).is_ai()
    }

    pub fn interpreter(&self, offset: usize) -> Option<&Interpreter> {
        let (team, local) = self.board.split(offset);
        self.board.teams().get(team)?.interpreter(local)
    }

    fn interpreters(&self) -> impl Iterator<Item = &Interpreter> + '_ {
        (0..self.board.piece_count()).filter_map(|o| self.interpreter(o))
    }

    /// Check out the interpreter at `offset`, run `f` against the board, then
    /// put it back. Returns false when the piece has no interpreter.
    fn with_interpreter<F>(&mut self, offset: usize, f: F) -> bool
    where
        F: FnOnce(&mut Interpreter, &mut TurnContext<'_>),
    {
        let (team, local) = self.board.split(offset);
        let Some(mut vm) = self.board.team_mut(team).take_interpreter(local) else {
            return false;
        };
        f(&mut vm, &mut TurnContext::new(&mut self.board, offset));
        self.board.team_mut(team).restore_interpreter(local, vm);
        true
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PieceCounts, PlayerConfig};
    use crate::hex::Hex;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = MatchConfig::default().with_side_length(9);
        assert_eq!(Game::new(&config).unwrap_err(), ConfigError::SideLength(9));

        let config = MatchConfig::default().with_players(vec![PlayerConfig::human()]);
        assert_eq!(Game::new(&config).unwrap_err(), ConfigError::PlayerCount(1));
    }

    #[test]
    fn test_init_ai_builds_words() {
        let config = MatchConfig::duel(
            lines(&["variable seen", ": play 1 seen ! ;"]),
            lines(&["( no play word )"]),
        )
        .with_seed(1);
        let game = Game::new(&config).unwrap();
        assert!(game.current_is_ai());
        for offset in 0..6 {
            let vm = game.interpreter(offset).unwrap();
            assert!(vm.has_word("play"));
        }
        assert!(game.interpreter(0).unwrap().variable("seen").is_some());
        assert!(game.interpreter(3).unwrap().variable("seen").is_none());
    }

    #[test]
    fn test_play_ai_runs_current_piece_once() {
        let config = MatchConfig::duel(
            lines(&["variable n", ": play n ? 1 + n ! ;"]),
            lines(&[": play ;"]),
        )
        .with_seed(1);
        let mut game = Game::new(&config).unwrap();

        assert!(game.play_ai());
        assert_eq!(game.interpreter(0).unwrap().variable("n"), Some(&crate::script::Value::Int(1)));
        assert_eq!(game.interpreter(1).unwrap().variable("n"), Some(&crate::script::Value::Int(0)));

        game.end_turn();
        assert_eq!(game.board().current(), 3);
        assert_eq!(game.turns(), 1);
    }

    #[test]
    fn test_human_pieces_pass() {
        let mut game = Game::new(&MatchConfig::default()).unwrap();
        assert!(!game.current_is_ai());
        assert!(!game.play_ai());

        let report = game.run(12);
        assert_eq!(report.result, GameResult::Ongoing);
        assert_eq!(report.turns, 12);
        assert_eq!(report.rounds, 3);
        assert_eq!(report.survivors, vec![3, 3]);
        assert!(report.is_draw());
    }

    #[test]
    fn test_scout_eliminates_last_sniper() {
        let config = MatchConfig::default().with_pieces(PieceCounts::new(1, 1, 0));
        let mut game = Game::new(&config).unwrap();
        let board = game.board_mut();

        // Blue is down to a wounded sniper two hexes from the Red scout
        board.team_mut(1).pieces_mut()[0].take_damage(1);
        board.team_mut(1).pieces_mut()[1].take_damage(1);
        board.place(0, Hex::axial(0, 0)).unwrap();
        board.place(3, Hex::axial(0, 2)).unwrap();
        assert_eq!(board.position(0).distance(board.position(3)), 2);

        let shot = board.shoot_space(0, Hex::axial(0, 2)).unwrap();
        assert_eq!(shot.hidden, vec![3]);
        assert_eq!(board.piece(3).current_health, 0);
        assert_eq!(board.remaining_teams(), 1);

        assert_eq!(game.end_turn(), GameResult::Won(0));
        assert_eq!(game.result(), GameResult::Won(0));
        // Finished matches ignore further turns
        assert!(!game.play_ai());
        assert_eq!(game.end_turn(), GameResult::Won(0));
        assert_eq!(game.turns(), 1);

        let report = game.report();
        assert_eq!(report.winner(), Some(0));
        assert_eq!(report.survivors, vec![2, 0]);
    }
}
