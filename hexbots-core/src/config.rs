//! Match configuration
//!
//! Loaded from JSON. Program files named by a player are resolved relative
//! to the config file's directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::board::PLAYER_COUNTS;
use crate::error::ConfigError;
use crate::hex::SIDE_LENGTHS;
use crate::piece::PieceKind;

/// Pieces per team, by kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceCounts {
    pub scouts: usize,
    pub snipers: usize,
    pub tanks: usize,
}

impl Default for PieceCounts {
    fn default() -> Self {
        Self {
            scouts: 1,
            snipers: 1,
            tanks: 1,
        }
    }
}

impl PieceCounts {
    pub fn new(scouts: usize, snipers: usize, tanks: usize) -> Self {
        Self { scouts, snipers, tanks }
    }

    pub fn total(&self) -> usize {
        self.scouts + self.snipers + self.tanks
    }

    /// Team roster in local-index order: scouts, then snipers, then tanks
    pub fn kinds(&self) -> Vec<PieceKind> {
        std::iter::repeat(PieceKind::Scout)
            .take(self.scouts)
            .chain(std::iter::repeat(PieceKind::Sniper).take(self.snipers))
            .chain(std::iter::repeat(PieceKind::Tank).take(self.tanks))
            .collect()
    }
}

/// Interpreter resource limits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptLimits {
    /// Wall-clock budget for a single loop, in milliseconds
    pub loop_timeout_ms: u64,
    /// User-word expansions allowed per run
    pub max_expansions: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            loop_timeout_ms: 1000,
            max_expansions: 100_000,
        }
    }
}

impl ScriptLimits {
    pub fn loop_timeout(&self) -> Duration {
        Duration::from_millis(self.loop_timeout_ms)
    }
}

/// One seat at the table
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub ai: bool,
    /// Source lines per piece. A single program is shared by every piece.
    pub programs: Vec<Vec<String>>,
    /// Script files, read into `programs` by [`MatchConfig::load`]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub program_files: Vec<PathBuf>,
}

impl PlayerConfig {
    pub fn human() -> Self {
        Self::default()
    }

    pub fn robot(programs: Vec<Vec<String>>) -> Self {
        Self {
            ai: true,
            programs,
            program_files: Vec::new(),
        }
    }

    /// Every piece runs the same program
    pub fn shared(program: Vec<String>) -> Self {
        Self::robot(vec![program])
    }

    /// Program driving the piece at `local`
    pub fn program_for(&self, local: usize) -> &[String] {
        match self.programs.len() {
            1 => &self.programs[0],
            _ => self.programs.get(local).map(Vec::as_slice).unwrap_or_default(),
        }
    }

    fn resolve_files(&mut self, base: &Path) -> anyhow::Result<()> {
        if self.program_files.is_empty() {
            return Ok(());
        }
        self.programs = self
            .program_files
            .iter()
            .map(|file| {
                let path = base.join(file);
                let source = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read script {}", path.display()))?;
                Ok(source.lines().map(str::to_string).collect())
            })
            .collect::<anyhow::Result<_>>()?;
        Ok(())
    }
}

/// Everything needed to set up a match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub name: String,
    pub side_length: u8,
    pub players: Vec<PlayerConfig>,
    pub pieces: PieceCounts,
    pub limits: ScriptLimits,
    /// Random seed for the interpreters (None = random)
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            side_length: 5,
            players: vec![PlayerConfig::human(), PlayerConfig::human()],
            pieces: PieceCounts::default(),
            limits: ScriptLimits::default(),
            seed: None,
        }
    }
}

impl MatchConfig {
    /// Two script players, each sharing one program across its pieces
    pub fn duel(first: Vec<String>, second: Vec<String>) -> Self {
        Self {
            players: vec![PlayerConfig::shared(first), PlayerConfig::shared(second)],
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_side_length(mut self, side_length: u8) -> Self {
        self.side_length = side_length;
        self
    }

    pub fn with_players(mut self, players: Vec<PlayerConfig>) -> Self {
        self.players = players;
        self
    }

    pub fn with_pieces(mut self, pieces: PieceCounts) -> Self {
        self.pieces = pieces;
        self
    }

    pub fn with_limits(mut self, limits: ScriptLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the table layout before any board is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !PLAYER_COUNTS.contains(&self.players.len()) {
            return Err(ConfigError::PlayerCount(self.players.len()));
        }
        if !SIDE_LENGTHS.contains(&self.side_length) {
            return Err(ConfigError::SideLength(self.side_length));
        }
        let expected = self.pieces.total();
        if expected == 0 {
            return Err(ConfigError::EmptyTeam);
        }
        for (player, p) in self.players.iter().enumerate() {
            let found = p.programs.len();
            if p.ai && found != 1 && found != expected {
                return Err(ConfigError::ProgramCount { player, expected, found });
            }
        }
        Ok(())
    }

    /// Load from a JSON file and read any referenced script files
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read match config {}", path.display()))?;
        let mut config: MatchConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse match config {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for player in &mut config.players {
            player.resolve_files(base)?;
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_piece_counts() {
        let counts = PieceCounts::new(2, 0, 1);
        assert_eq!(counts.total(), 3);
        assert_eq!(
            counts.kinds(),
            vec![PieceKind::Scout, PieceKind::Scout, PieceKind::Tank]
        );
    }

    #[test]
    fn test_defaults_validate() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.loop_timeout(), Duration::from_secs(1));
        assert_eq!(config.limits.max_expansions, 100_000);
    }

    #[test]
    fn test_validate_rejections() {
        let config = MatchConfig::default().with_side_length(6);
        assert_eq!(config.validate(), Err(ConfigError::SideLength(6)));

        let config = MatchConfig::default().with_players(vec![PlayerConfig::human(); 4]);
        assert_eq!(config.validate(), Err(ConfigError::PlayerCount(4)));

        let config = MatchConfig::default().with_pieces(PieceCounts::new(0, 0, 0));
        assert_eq!(config.validate(), Err(ConfigError::EmptyTeam));

        let two = vec![lines(&[": play ;"]), lines(&[": play ;"])];
        let config = MatchConfig::default()
            .with_players(vec![PlayerConfig::robot(two), PlayerConfig::human()]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ProgramCount { player: 0, expected: 3, found: 2 })
        );
    }

    #[test]
    fn test_shared_program() {
        let player = PlayerConfig::shared(lines(&[": play move! ;"]));
        assert_eq!(player.program_for(0), player.program_for(2));
        assert!(PlayerConfig::human().program_for(0).is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.json");
        let config = MatchConfig::duel(lines(&[": play ;"]), lines(&[": play scan! drop ;"]))
            .with_name("duel")
            .with_side_length(7)
            .with_seed(42);

        config.save(&path).unwrap();
        let loaded = MatchConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_resolves_program_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bot.fth"), ": play\n  move!\n;\n").unwrap();
        let json = r#"{
            "name": "files",
            "players": [
                { "ai": true, "program_files": ["bot.fth"] },
                { "ai": false }
            ]
        }"#;
        let path = dir.path().join("match.json");
        std::fs::write(&path, json).unwrap();

        let config = MatchConfig::load(&path).unwrap();
        assert_eq!(config.side_length, 5);
        assert_eq!(config.players[0].programs, vec![lines(&[": play", "  move!", ";"])]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_script_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.json");
        std::fs::write(&path, r#"{ "players": [ { "ai": true, "program_files": ["nope.fth"] }, {} ] }"#)
            .unwrap();
        let err = MatchConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("nope.fth"));
    }
}
