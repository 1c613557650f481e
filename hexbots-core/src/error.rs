//! Error types

use crate::hex::Hex;

/// Match construction failures. Fatal: no partial match is created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported player count: {0} (expected 2, 3 or 6)")]
    PlayerCount(usize),

    #[error("Unsupported board side length: {0} (expected 5 or 7)")]
    SideLength(u8),

    #[error("Teams must have at least one piece")]
    EmptyTeam,

    #[error("Player {player} has {found} programs, expected one per piece ({expected})")]
    ProgramCount {
        player: usize,
        expected: usize,
        found: usize,
    },
}

/// Board actions rejected before any mutation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("It is not piece {0}'s turn")]
    NotYourTurn(usize),

    #[error("Piece {0} is dead")]
    PieceDead(usize),

    #[error("Target {0} is off the board")]
    OutOfBounds(Hex),

    #[error("Target is {distance} hexes away but only {movement} movement is left")]
    TooFar { distance: i32, movement: i32 },

    #[error("Target is {distance} hexes away but range is {range}")]
    OutOfRange { distance: i32, range: i32 },

    #[error("Piece {0} has already shot this round")]
    AlreadyShot(usize),
}

/// Interpreter diagnostics. Recorded and logged, never propagated past the
/// interpreter loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("`{word}` needs {needed} operands, stack has {found}")]
    StackUnderflow {
        word: String,
        needed: usize,
        found: usize,
    },

    #[error("`{word}` expects {expected}")]
    TypeMismatch { word: String, expected: &'static str },

    #[error("`{0}` divided by zero")]
    DivisionByZero(String),

    #[error("`{0}` overflowed")]
    Overflow(String),

    #[error("`{0}` is only allowed while playing a turn")]
    Restricted(String),

    #[error("`{0}` used outside of a loop")]
    NoLoop(String),

    #[error("`{0}` expects a name to follow")]
    MissingName(String),

    #[error("`{0}` is a builtin word and cannot be redefined")]
    ReservedName(String),

    #[error("Unknown variable address {0}")]
    BadAddress(usize),

    #[error("No scan entry {0}")]
    BadScanIndex(i64),

    #[error("Loop exceeded its time limit")]
    LoopTimeout,

    #[error("Word expansion limit of {0} reached")]
    ExpansionLimit(usize),

    #[error("Loops nested deeper than {0}")]
    LoopDepth(usize),

    #[error("Board rejected action: {0}")]
    Action(#[from] ActionError),
}

impl ScriptError {
    /// Errors that discard the rest of the turn
    pub fn aborts_turn(&self) -> bool {
        matches!(
            self,
            ScriptError::Restricted(_)
                | ScriptError::LoopTimeout
                | ScriptError::ExpansionLimit(_)
                | ScriptError::LoopDepth(_)
        )
    }

    /// Operand errors; the stack is cleared before execution continues
    pub fn clears_stack(&self) -> bool {
        matches!(
            self,
            ScriptError::StackUnderflow { .. }
                | ScriptError::TypeMismatch { .. }
                | ScriptError::DivisionByZero(_)
                | ScriptError::Overflow(_)
                | ScriptError::BadAddress(_)
                | ScriptError::BadScanIndex(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_error_classes() {
        assert!(ScriptError::LoopTimeout.aborts_turn());
        assert!(!ScriptError::LoopTimeout.clears_stack());
        assert!(ScriptError::DivisionByZero("/mod".into()).clears_stack());

        let rejected: ScriptError = ActionError::AlreadyShot(2).into();
        assert!(!rejected.aborts_turn());
        assert!(!rejected.clears_stack());
        assert_eq!(rejected.to_string(), "Board rejected action: Piece 2 has already shot this round");
    }
}
