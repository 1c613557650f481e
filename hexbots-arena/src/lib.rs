//! HEXBOTS Arena - Batch play between robot scripts
//!
//! This crate runs many independent AI matches and aggregates the results:
//! - Seat rotation so every program plays from every corner
//! - Sequential or rayon-parallel execution
//! - Per-player win, draw and length statistics
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_batch (orchestration)
//! - Level 2: execute_games, aggregate_results (phases)
//! - Level 3: play_single_game (steps)
//! - Level 4: configuration

mod batch;
mod config;
mod game_runner;

pub use batch::{run_batch, BatchSummary};
pub use config::ArenaConfig;
pub use game_runner::{play_single_game, GameRecord, GameSetup};
