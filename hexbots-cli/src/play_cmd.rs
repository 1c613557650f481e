//! Play command - run one match between robot scripts
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: collect_events()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use hexbots_core::{Event, Game, GameResult, MatchConfig, MatchReport, TEAM_COLORS};

use crate::source::MatchSource;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub source: MatchSource,

    /// Stop the match after this many turns
    #[arg(long, default_value = "600")]
    pub max_turns: u32,

    /// Print the board event journal
    #[arg(long)]
    pub events: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Finished match plus what scripts printed and what happened on the board
#[derive(Debug, Serialize)]
struct PlayResults {
    report: MatchReport,
    output: Vec<(usize, String)>,
    events: Vec<Event>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build the match config
/// 2. Play the match to the end or the turn limit
/// 3. Report results
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = args.source.load(seed)?;

    tracing::info!(
        "Starting match '{}': {} players, side {}",
        config.name,
        config.players.len(),
        config.side_length
    );

    let results = play_match(&config, args.max_turns)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_match(config: &MatchConfig, max_turns: u32) -> Result<PlayResults> {
    let mut game = Game::new(config)?;
    let report = game.run(max_turns);

    let output = (0..game.board().piece_count())
        .filter_map(|offset| game.interpreter(offset).map(|vm| (offset, vm)))
        .flat_map(|(offset, vm)| vm.output().iter().map(move |line| (offset, line.clone())))
        .collect();

    Ok(PlayResults {
        report,
        output,
        events: collect_events(&game),
    })
}

fn report_results(results: &PlayResults, args: &PlayArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results, args.events);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn collect_events(game: &Game) -> Vec<Event> {
    game.board().journal().iter().map(|n| n.event.clone()).collect()
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn describe_result(result: GameResult) -> String {
    match result {
        GameResult::Won(team) => format!("{} wins", team_name(team)),
        GameResult::Draw => "Draw".to_string(),
        GameResult::Ongoing => "Stopped at turn limit".to_string(),
    }
}

fn team_name(team: usize) -> &'static str {
    TEAM_COLORS.get(team).map_or("?", |c| c.name())
}

fn print_json_results(results: &PlayResults) {
    if let Ok(json) = serde_json::to_string_pretty(results) {
        println!("{}", json);
    }
}

fn print_text_results(results: &PlayResults, show_events: bool) {
    let report = &results.report;

    println!("\n=== Match: {} ===", report.name);
    println!("Result:        {}", describe_result(report.result));
    println!("Turns:         {}", report.turns);
    println!("Rounds:        {}", report.rounds);
    println!("Script errors: {}", report.script_errors);

    println!("\nSurvivors:");
    for (team, living) in report.survivors.iter().enumerate() {
        println!("  {:<7} {}", team_name(team), living);
    }

    if !results.output.is_empty() {
        println!("\nScript output:");
        for (piece, line) in &results.output {
            println!("  [{}] {}", piece, line);
        }
    }

    if show_events {
        println!("\nEvents:");
        for event in &results.events {
            println!("  {:?}", event);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_describe_result() {
        assert_eq!(describe_result(GameResult::Won(0)), "Red wins");
        assert_eq!(describe_result(GameResult::Won(1)), "Orange wins");
        assert_eq!(describe_result(GameResult::Draw), "Draw");
        assert_eq!(describe_result(GameResult::Ongoing), "Stopped at turn limit");
    }

    #[test]
    fn test_play_match_collects_output_and_events() {
        let config = MatchConfig::duel(lines(": play 7 . ;"), lines(": play move! ;")).with_seed(3);
        let results = play_match(&config, 6).unwrap();

        assert_eq!(results.report.turns, 6);
        assert_eq!(results.report.result, GameResult::Ongoing);
        // Red pieces play turns 0, 2 and 4
        assert_eq!(results.output.len(), 3);
        assert!(results.output.iter().all(|(piece, line)| *piece < 3 && line == "7"));
        assert!(results
            .events
            .iter()
            .any(|e| matches!(e, Event::Arrived { piece: 3, .. })));
    }

    #[test]
    fn test_play_match_rejects_bad_config() {
        let config = MatchConfig::default().with_side_length(4);
        assert!(play_match(&config, 10).is_err());
    }
}
