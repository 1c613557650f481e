//! Builtin word table

/// A builtin instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Word {
    // Arithmetic
    Add,
    Sub,
    Mul,
    DivMod,
    // Boolean
    And,
    Or,
    Invert,
    // Stack
    Dup,
    Drop,
    Swap,
    Rot,
    // Comparison
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Equal,
    NotEqual,
    // Control
    If,
    Else,
    Then,
    Begin,
    Until,
    Do,
    Loop,
    Leave,
    Index,
    // Declarations
    Variable,
    Define,
    EndDefine,
    Store,
    Fetch,
    // Misc
    Random,
    Print,
    // Piece queries (restricted)
    Health,
    HealthLeft,
    Moves,
    MovesLeft,
    Attack,
    Range,
    Team,
    Kind,
    // Board actions (restricted)
    Turn,
    Move,
    Shoot,
    Check,
    Scan,
    Identify,
    // Messaging
    Send,
    HasMessage,
    Receive,
}

/// Source spelling of every builtin
const WORDS: &[(&str, Word)] = &[
    ("+", Word::Add),
    ("-", Word::Sub),
    ("*", Word::Mul),
    ("/mod", Word::DivMod),
    ("and", Word::And),
    ("or", Word::Or),
    ("invert", Word::Invert),
    ("dup", Word::Dup),
    ("drop", Word::Drop),
    ("swap", Word::Swap),
    ("rot", Word::Rot),
    (">", Word::Greater),
    (">=", Word::GreaterEq),
    ("<", Word::Less),
    ("<=", Word::LessEq),
    ("=", Word::Equal),
    ("<>", Word::NotEqual),
    ("if", Word::If),
    ("else", Word::Else),
    ("then", Word::Then),
    ("begin", Word::Begin),
    ("until", Word::Until),
    ("do", Word::Do),
    ("loop", Word::Loop),
    ("leave", Word::Leave),
    ("I", Word::Index),
    ("variable", Word::Variable),
    (":", Word::Define),
    (";", Word::EndDefine),
    ("!", Word::Store),
    ("?", Word::Fetch),
    ("random", Word::Random),
    (".", Word::Print),
    ("health", Word::Health),
    ("healthLeft", Word::HealthLeft),
    ("moves", Word::Moves),
    ("movesLeft", Word::MovesLeft),
    ("attack", Word::Attack),
    ("range", Word::Range),
    ("team", Word::Team),
    ("type", Word::Kind),
    ("turn!", Word::Turn),
    ("move!", Word::Move),
    ("shoot!", Word::Shoot),
    ("check!", Word::Check),
    ("scan!", Word::Scan),
    ("identify!", Word::Identify),
    ("send!", Word::Send),
    ("mesg?", Word::HasMessage),
    ("recv!", Word::Receive),
];

impl Word {
    pub fn lookup(token: &str) -> Option<Word> {
        WORDS.iter().find(|(name, _)| *name == token).map(|&(_, w)| w)
    }

    pub fn name(self) -> &'static str {
        WORDS
            .iter()
            .find(|(_, w)| *w == self)
            .map_or("?", |&(name, _)| name)
    }

    /// Words that read piece stats or touch the board; play mode only
    pub fn is_restricted(self) -> bool {
        matches!(
            self,
            Word::Health
                | Word::HealthLeft
                | Word::Moves
                | Word::MovesLeft
                | Word::Attack
                | Word::Range
                | Word::Team
                | Word::Kind
                | Word::Turn
                | Word::Move
                | Word::Shoot
                | Word::Check
                | Word::Scan
                | Word::Identify
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_round_trips_names() {
        for &(name, word) in WORDS {
            assert_eq!(Word::lookup(name), Some(word));
            assert_eq!(word.name(), name);
        }
        assert_eq!(Word::lookup("i"), None);
        assert_eq!(Word::lookup("Move!"), None);
    }

    #[test]
    fn test_restricted_set() {
        let restricted: Vec<_> = WORDS.iter().filter(|(_, w)| w.is_restricted()).collect();
        assert_eq!(restricted.len(), 14);
        assert!(!Word::Send.is_restricted());
        assert!(!Word::Print.is_restricted());
    }
}
