//! Stack values

use std::fmt;

/// Prefix used when rendering a variable address
pub const ADDRESS_SENTINEL: char = '&';

/// A stack slot.
///
/// Scripts see every slot as a string; the tag records how the string was
/// produced so words can validate operands without reparsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Address(usize),
    Str(String),
}

impl Value {
    /// Interpret a source token that is not a word or a variable name
    pub fn literal(token: &str) -> Self {
        match token {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => token
                .parse::<i64>()
                .map(Value::Int)
                .unwrap_or_else(|_| Value::Str(token.to_string())),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Booleans and addresses never take part in ordering
    pub fn is_comparable(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Str(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Address(a) => write!(f, "{ADDRESS_SENTINEL}{a}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}
