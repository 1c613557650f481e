//! HEXBOTS Core - Game engine and robot scripting
//!
//! This crate provides the core game logic for HEXBOTS:
//! - Hex geometry (cube coordinates, bounds, direction tables)
//! - Pieces, teams and per-piece mailboxes
//! - Board: turn order, movement, shooting, visibility, elimination
//! - A Forth-like script interpreter driving AI pieces
//! - Match orchestration and configuration

pub mod hex;
pub mod piece;
pub mod mailbox;
pub mod team;
pub mod board;
pub mod events;
pub mod script;
pub mod game;
pub mod config;
pub mod error;

// Re-exports for convenient access
pub use hex::{Hex, DirectionTable, DIRECTIONS, SIDE_LENGTHS};
pub use piece::{Piece, PieceKind, PIECE_KINDS};
pub use mailbox::{Mailbox, MAILBOX_CAPACITY};
pub use team::{Team, TeamColor, TEAM_COLORS};
pub use board::{Board, GameResult, PLAYER_COUNTS};
pub use events::{Event, MoveOutcome, Notice, ShotOutcome};
pub use script::{Interpreter, TurnContext, Value};
pub use game::{Game, MatchReport};
pub use config::{MatchConfig, PieceCounts, PlayerConfig, ScriptLimits};
pub use error::{ActionError, ConfigError, ScriptError};
