//! Piece type definitions and per-unit combat state

use serde::{Deserialize, Serialize};

/// Piece kind; each kind has a fixed stat preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Scout,
    Sniper,
    Tank,
}

/// Stat preset for a piece kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preset {
    pub health: i32,
    pub movement: i32,
    pub attack: i32,
    pub range: i32,
}

impl Preset {
    const fn new(health: i32, movement: i32, attack: i32, range: i32) -> Self {
        Self { health, movement, attack, range }
    }
}

/// Kinds in team order
pub const PIECE_KINDS: [PieceKind; 3] = [PieceKind::Scout, PieceKind::Sniper, PieceKind::Tank];

impl PieceKind {
    pub const fn preset(self) -> Preset {
        match self {
            PieceKind::Scout => Preset::new(1, 3, 1, 2),
            PieceKind::Sniper => Preset::new(2, 2, 2, 3),
            PieceKind::Tank => Preset::new(3, 1, 3, 1),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PieceKind::Scout => "Scout",
            PieceKind::Sniper => "Sniper",
            PieceKind::Tank => "Tank",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        PIECE_KINDS.iter().copied().find(|k| k.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A piece in play
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub health: i32,
    pub current_health: i32,
    pub movement: i32,
    pub current_movement: i32,
    pub attack: i32,
    pub range: i32,
    pub facing: u8,
    pub has_shot: bool,
    pub alive: bool,
}

impl Piece {
    /// Fresh piece with its kind's preset
    pub fn new(kind: PieceKind, facing: u8) -> Self {
        let p = kind.preset();
        Self {
            kind,
            health: p.health,
            current_health: p.health,
            movement: p.movement,
            current_movement: p.movement,
            attack: p.attack,
            range: p.range,
            facing: facing % 6,
            has_shot: false,
            alive: true,
        }
    }

    /// Set absolute facing (0-5)
    pub fn rotate(&mut self, direction: u8) {
        self.facing = direction % 6;
    }

    /// Apply damage, returning the amount actually taken.
    /// A piece dies once, the first time its health reaches 0.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        if !self.alive || amount <= 0 {
            return 0;
        }
        let taken = amount.min(self.current_health);
        self.current_health -= taken;
        if self.current_health == 0 {
            self.alive = false;
        }
        taken
    }

    /// Spend movement points
    pub fn spend_movement(&mut self, amount: i32) {
        self.current_movement = (self.current_movement - amount).max(0);
    }

    /// Replenish movement and clear the shot flag for a new round
    pub fn reset_round(&mut self) {
        self.current_movement = self.movement;
        self.has_shot = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let scout = Piece::new(PieceKind::Scout, 0);
        assert_eq!((scout.health, scout.movement, scout.attack, scout.range), (1, 3, 1, 2));
        let tank = Piece::new(PieceKind::Tank, 0);
        assert_eq!((tank.health, tank.movement, tank.attack, tank.range), (3, 1, 3, 1));
    }

    #[test]
    fn test_kind_lookup() {
        assert_eq!(PieceKind::from_name("sniper"), Some(PieceKind::Sniper));
        assert_eq!(PieceKind::from_name("Tank"), Some(PieceKind::Tank));
        assert_eq!(PieceKind::from_name("King"), None);
    }

    #[test]
    fn test_rotate_wraps() {
        let mut p = Piece::new(PieceKind::Scout, 0);
        p.rotate(7);
        assert_eq!(p.facing, 1);
    }

    #[test]
    fn test_take_damage_clamps_and_kills_once() {
        let mut p = Piece::new(PieceKind::Sniper, 0);
        assert_eq!(p.take_damage(3), 2);
        assert_eq!(p.current_health, 0);
        assert!(!p.alive);
        assert_eq!(p.take_damage(1), 0);
        assert_eq!(p.current_health, 0);
        assert!(!p.alive);
    }

    #[test]
    fn test_reset_round() {
        let mut p = Piece::new(PieceKind::Scout, 0);
        p.spend_movement(2);
        p.has_shot = true;
        p.reset_round();
        assert_eq!(p.current_movement, 3);
        assert!(!p.has_shot);
    }
}
