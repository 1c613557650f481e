//! Teams: colors, pieces, mailboxes and optional script brains

use serde::{Deserialize, Serialize};

use crate::mailbox::Mailbox;
use crate::piece::Piece;
use crate::script::Interpreter;

/// Team color identity, in seating order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

pub const TEAM_COLORS: [TeamColor; 6] = [
    TeamColor::Red,
    TeamColor::Orange,
    TeamColor::Yellow,
    TeamColor::Green,
    TeamColor::Blue,
    TeamColor::Purple,
];

impl TeamColor {
    pub const fn name(self) -> &'static str {
        match self {
            TeamColor::Red => "Red",
            TeamColor::Orange => "Orange",
            TeamColor::Yellow => "Yellow",
            TeamColor::Green => "Green",
            TeamColor::Blue => "Blue",
            TeamColor::Purple => "Purple",
        }
    }
}

impl std::fmt::Display for TeamColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A team of pieces.
///
/// AI teams carry one interpreter per piece. While a piece's script runs the
/// interpreter is checked out of its slot so the board can be borrowed
/// mutably.
#[derive(Debug)]
pub struct Team {
    color: TeamColor,
    pieces: Vec<Piece>,
    mailboxes: Vec<Mailbox>,
    interpreters: Option<Vec<Option<Interpreter>>>,
    eliminated: bool,
}

impl Team {
    /// Human-controlled team
    pub fn human(color: TeamColor, pieces: Vec<Piece>) -> Self {
        let mailboxes = vec![Mailbox::new(); pieces.len()];
        Self {
            color,
            pieces,
            mailboxes,
            interpreters: None,
            eliminated: false,
        }
    }

    /// Script-controlled team, one interpreter per piece
    pub fn robot(color: TeamColor, pieces: Vec<Piece>, interpreters: Vec<Interpreter>) -> Self {
        let mut team = Self::human(color, pieces);
        team.interpreters = Some(interpreters.into_iter().map(Some).collect());
        team
    }

    pub fn color(&self) -> TeamColor {
        self.color
    }

    pub fn is_ai(&self) -> bool {
        self.interpreters.is_some()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, local: usize) -> Option<&Piece> {
        self.pieces.get(local)
    }

    pub(crate) fn pieces_mut(&mut self) -> &mut [Piece] {
        &mut self.pieces
    }

    pub fn mailbox(&self, local: usize) -> Option<&Mailbox> {
        self.mailboxes.get(local)
    }

    pub fn mailbox_mut(&mut self, local: usize) -> Option<&mut Mailbox> {
        self.mailboxes.get_mut(local)
    }

    pub fn living(&self) -> usize {
        self.pieces.iter().filter(|p| p.alive).count()
    }

    pub fn is_eliminated(&self) -> bool {
        self.eliminated
    }

    /// Flag the team eliminated if every piece is dead.
    /// Returns true only the first time the flag is set.
    pub(crate) fn check_eliminated(&mut self) -> bool {
        if self.eliminated || self.living() > 0 {
            return false;
        }
        self.eliminated = true;
        true
    }

    pub fn interpreter(&self, local: usize) -> Option<&Interpreter> {
        self.interpreters.as_ref()?.get(local)?.as_ref()
    }

    pub(crate) fn take_interpreter(&mut self, local: usize) -> Option<Interpreter> {
        self.interpreters.as_mut()?.get_mut(local)?.take()
    }

    pub(crate) fn restore_interpreter(&mut self, local: usize, vm: Interpreter) {
        if let Some(slot) = self.interpreters.as_mut().and_then(|v| v.get_mut(local)) {
            *slot = Some(vm);
        }
    }
}
