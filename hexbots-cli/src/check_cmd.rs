//! Check command - load scripts on a sandbox board and report diagnostics
//!
//! - Level 1: run() - orchestration
//! - Level 3: check_script()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use hexbots_core::{Game, MatchConfig};

use crate::source::read_script;

#[derive(Args)]
pub struct CheckArgs {
    /// Robot script files
    #[arg(required = true, value_name = "FILE")]
    pub scripts: Vec<PathBuf>,

    /// Also run the `play` word once for the first piece
    #[arg(long)]
    pub play: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Diagnostics for one script
#[derive(Debug, Serialize)]
struct ScriptCheck {
    path: PathBuf,
    errors: Vec<String>,
    stack: Vec<String>,
    output: Vec<String>,
}

impl ScriptCheck {
    fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run check command. Fails when any script reports a diagnostic.
pub fn run(args: CheckArgs, seed: Option<u64>) -> Result<()> {
    let checks = args
        .scripts
        .iter()
        .map(|path| {
            let program = read_script(path)?;
            check_script(path.clone(), program, args.play, seed.unwrap_or(0))
        })
        .collect::<Result<Vec<_>>>()?;

    if args.json {
        print_json_results(&checks);
    } else {
        print_text_results(&checks);
    }

    let failed = checks.iter().filter(|c| !c.is_clean()).count();
    if failed > 0 {
        bail!("{} of {} scripts reported errors", failed, checks.len());
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Seat the script against an idle opponent, initialize it and optionally
/// play one turn
fn check_script(path: PathBuf, program: Vec<String>, play: bool, seed: u64) -> Result<ScriptCheck> {
    let config = MatchConfig::duel(program, vec![": play ;".to_string()])
        .with_name("check")
        .with_seed(seed);
    let mut game = Game::new(&config)?;
    if play {
        game.play_ai();
    }

    let (errors, stack, output) = match game.interpreter(0) {
        Some(vm) => (
            vm.diagnostics().iter().map(ToString::to_string).collect(),
            vm.stack(),
            vm.output().to_vec(),
        ),
        None => Default::default(),
    };
    Ok(ScriptCheck {
        path,
        errors,
        stack,
        output,
    })
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_json_results(checks: &[ScriptCheck]) {
    if let Ok(json) = serde_json::to_string_pretty(checks) {
        println!("{}", json);
    }
}

fn print_text_results(checks: &[ScriptCheck]) {
    for check in checks {
        let status = if check.is_clean() { "ok" } else { "FAILED" };
        println!("{}: {}", check.path.display(), status);
        for error in &check.errors {
            println!("  error: {}", error);
        }
        if !check.stack.is_empty() {
            println!("  stack: {}", check.stack.join(" "));
        }
        for line in &check.output {
            println!("  output: {}", line);
        }
    }
}
