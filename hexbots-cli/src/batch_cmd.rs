//! Batch command - many matches between the same scripts
//!
//! - Level 1: run() - orchestration
//! - Level 2: report_results()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;

use hexbots_arena::{run_batch, ArenaConfig, BatchSummary};

use crate::source::MatchSource;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BatchArgs {
    #[command(flatten)]
    pub source: MatchSource,

    /// Number of matches to play (seats rotate between matches)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Stop each match after this many turns
    #[arg(long, default_value = "600")]
    pub max_turns: u32,

    /// Play matches one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Keep every player in its configured seat
    #[arg(long)]
    pub fixed_seats: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl BatchArgs {
    fn arena_config(&self, seed: Option<u64>) -> ArenaConfig {
        let mut arena = ArenaConfig::new(self.games).with_max_turns(self.max_turns);
        if let Some(seed) = seed {
            arena = arena.with_seed(seed);
        }
        if self.sequential {
            arena = arena.sequential();
        }
        if self.fixed_seats {
            arena = arena.fixed_seats();
        }
        arena
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run batch command
pub fn run(args: BatchArgs, seed: Option<u64>) -> Result<()> {
    let config = args.source.load(seed)?;
    let arena = args.arena_config(seed);

    let summary = run_batch(&config, &arena)?;

    report_results(&summary, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn report_results(summary: &BatchSummary, json: bool) {
    if json {
        print_json_results(summary);
    } else {
        print_text_results(summary);
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn percent(rate: f32) -> f32 {
    rate * 100.0
}

fn print_json_results(summary: &BatchSummary) {
    if let Ok(json) = serde_json::to_string_pretty(summary) {
        println!("{}", json);
    }
}

fn print_text_results(summary: &BatchSummary) {
    println!("\n=== Batch Results: {} ===", summary.name);
    println!("Total games:   {}", summary.games_played);
    for (player, wins) in summary.wins.iter().enumerate() {
        println!(
            "Player {} wins: {} ({:.1}%)",
            player,
            wins,
            percent(summary.win_rate(player))
        );
    }
    println!(
        "Draws:         {} ({:.1}%)",
        summary.draws,
        percent(summary.draw_rate())
    );
    println!("Avg turns:     {:.1}", summary.avg_turns);
    println!("Avg rounds:    {:.1}", summary.avg_rounds);
    println!("Script errors: {}", summary.script_errors);

    match summary.leader() {
        Some(player) => println!("\nLeader: player {}", player),
        None => println!("\nNo matches were won"),
    }
}
