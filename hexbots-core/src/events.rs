//! Board events and per-action outcomes for the presentation layer

use serde::{Deserialize, Serialize};

use crate::hex::Hex;

/// Something that happened on the board
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Departed { piece: usize, hex: Hex },
    Arrived { piece: usize, hex: Hex, facing: u8 },
    Shot { shooter: usize, from: Hex, target: Hex },
    Damaged { piece: usize, hex: Hex, amount: i32, health_left: i32 },
    Destroyed { piece: usize, hex: Hex },
    Eliminated { team: usize },
    NewRound { round: u32 },
}

/// An event plus the pieces that witnessed it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub event: Event,
    pub witnesses: Vec<usize>,
}

/// Result of a successful move, in the shape an animation layer consumes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub piece: usize,
    pub origin: Hex,
    pub displacement: Hex,
    pub range: i32,
    pub visible_teammates: Vec<usize>,
    pub visible_enemies: Vec<usize>,
}

/// Result of a successful shot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotOutcome {
    pub shooter_hex: Hex,
    pub target_hex: Hex,
    /// Pieces on the target hex when the shot was fired; hidden while the
    /// attack animates
    pub hidden: Vec<usize>,
}
