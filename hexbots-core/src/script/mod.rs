//! Forth-like robot scripting
//!
//! Each AI piece owns an [`Interpreter`]. Its program is parsed once outside
//! play mode to build user words and variables, then the `play` word runs
//! once per turn with access to the restricted board words.

mod interpreter;
mod source;
mod value;
mod watchdog;
mod words;

pub use interpreter::{Interpreter, TurnContext, MAX_DIAGNOSTICS, MAX_LOOP_DEPTH, MAX_OUTPUT};
pub use source::{strip_comments, tokenize};
pub use value::{Value, ADDRESS_SENTINEL};
pub use watchdog::Watchdog;
pub use words::Word;
