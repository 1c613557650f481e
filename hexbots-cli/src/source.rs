//! Where a match comes from: a JSON config or a list of script files

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use hexbots_core::{MatchConfig, PlayerConfig};

#[derive(Args, Debug)]
pub struct MatchSource {
    /// Match config JSON file
    #[arg(long, value_name = "FILE", conflicts_with = "script")]
    pub config: Option<PathBuf>,

    /// Robot script, one per player; every piece of that player runs it
    #[arg(long, value_name = "FILE")]
    pub script: Vec<PathBuf>,

    /// Board side length (5 or 7), overrides the config
    #[arg(long)]
    pub side_length: Option<u8>,
}

impl MatchSource {
    /// Build the match config and apply command-line overrides
    pub fn load(&self, seed: Option<u64>) -> Result<MatchConfig> {
        let mut config = match (&self.config, self.script.as_slice()) {
            (Some(path), _) => MatchConfig::load(path)?,
            (None, []) => bail!("Either --config or at least two --script files are required"),
            (None, scripts) => from_scripts(scripts)?,
        };

        if let Some(side) = self.side_length {
            config.side_length = side;
        }
        if let Some(seed) = seed {
            config.seed = Some(seed);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Read a script file into source lines
pub fn read_script(path: &Path) -> Result<Vec<String>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    Ok(source.lines().map(str::to_string).collect())
}

fn from_scripts(scripts: &[PathBuf]) -> Result<MatchConfig> {
    let players = scripts
        .iter()
        .map(|path| read_script(path).map(PlayerConfig::shared))
        .collect::<Result<Vec<_>>>()?;

    let name = scripts
        .iter()
        .map(|p| p.file_stem().map_or_else(|| "?".into(), |s| s.to_string_lossy()))
        .collect::<Vec<_>>()
        .join("-vs-");

    Ok(MatchConfig::default().with_players(players).with_name(name))
}
