//! The stack machine
//!
//! Tokens are consumed one at a time from a pending queue. User words splice
//! their stored tokens back onto the front of the queue; loop bodies run
//! against a fresh queue while the outer one is set aside.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;

use crate::board::Board;
use crate::config::ScriptLimits;
use crate::error::{ActionError, ScriptError};

use super::source::tokenize;
use super::value::Value;
use super::watchdog::Watchdog;
use super::words::Word;

/// Diagnostics kept per interpreter; later ones are only logged
pub const MAX_DIAGNOSTICS: usize = 256;

/// Printed lines kept per interpreter; later ones are only logged
pub const MAX_OUTPUT: usize = 1024;

/// Nesting limit for loops, including loops reached through user words
pub const MAX_LOOP_DEPTH: usize = 64;

/// Word run once per turn
const PLAY_WORD: &str = "play";

/// The board and the piece a script acts for
pub struct TurnContext<'a> {
    pub board: &'a mut Board,
    pub piece: usize,
}

impl<'a> TurnContext<'a> {
    pub fn new(board: &'a mut Board, piece: usize) -> Self {
        Self { board, piece }
    }
}

type Step = Result<(), ScriptError>;

/// Per-piece script interpreter
#[derive(Clone, Debug)]
pub struct Interpreter {
    owner: usize,
    program: Vec<String>,
    stack: Vec<Value>,
    queue: VecDeque<String>,
    words: FxHashMap<String, Vec<String>>,
    variables: Vec<Value>,
    var_index: FxHashMap<String, usize>,
    loops: Vec<i64>,
    loop_depth: usize,
    play_mode: bool,
    aborted: bool,
    leaving: bool,
    expansions: usize,
    limits: ScriptLimits,
    scan: Vec<usize>,
    rng: ChaCha8Rng,
    diagnostics: Vec<ScriptError>,
    output: Vec<String>,
}

impl Interpreter {
    /// Interpreter for the piece at `owner` running `program` (raw source lines)
    pub fn new(owner: usize, program: Vec<String>) -> Self {
        Self {
            owner,
            program,
            stack: Vec::new(),
            queue: VecDeque::new(),
            words: FxHashMap::default(),
            variables: Vec::new(),
            var_index: FxHashMap::default(),
            loops: Vec::new(),
            loop_depth: 0,
            play_mode: false,
            aborted: false,
            leaving: false,
            expansions: 0,
            limits: ScriptLimits::default(),
            scan: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(owner as u64),
            diagnostics: Vec::new(),
            output: Vec::new(),
        }
    }

    pub fn with_limits(mut self, limits: ScriptLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    // ========================================================================
    // ENTRY POINTS
    // ========================================================================

    /// Run the whole program outside play mode, then make sure `play` exists
    pub fn initialize(&mut self, ctx: &mut TurnContext<'_>) {
        let tokens = tokenize(&self.program);
        self.begin_run(false, tokens);
        self.run(ctx);
        self.words.entry(PLAY_WORD.to_string()).or_default();
        tracing::debug!(
            "Piece {} initialized: {} words, {} variables",
            self.owner,
            self.words.len(),
            self.variables.len()
        );
    }

    /// Run the `play` word once with the restricted words unlocked
    pub fn play(&mut self, ctx: &mut TurnContext<'_>) {
        let body = self.words.get(PLAY_WORD).cloned().unwrap_or_default();
        // Scan results only hold for the turn they were taken in
        self.scan.clear();
        self.begin_run(true, body);
        self.run(ctx);
        self.play_mode = false;
        self.queue.clear();
    }

    /// Run extra source lines in the current mode
    pub fn eval<S: AsRef<str>>(&mut self, lines: &[S], ctx: &mut TurnContext<'_>) {
        let tokens = tokenize(lines);
        let play_mode = self.play_mode;
        self.begin_run(play_mode, tokens);
        self.run(ctx);
    }

    fn begin_run(&mut self, play_mode: bool, tokens: Vec<String>) {
        self.play_mode = play_mode;
        self.aborted = false;
        self.leaving = false;
        self.expansions = 0;
        self.queue = tokens.into();
    }

    /// Execute the next pending token. Returns false when nothing was pending.
    pub fn step(&mut self, ctx: &mut TurnContext<'_>) -> bool {
        let Some(token) = self.queue.pop_front() else {
            return false;
        };
        if let Err(err) = self.execute(&token, ctx) {
            self.fail(err);
        }
        true
    }

    /// Execute until the queue drains or the run is aborted
    pub fn run(&mut self, ctx: &mut TurnContext<'_>) {
        while !self.aborted && self.step(ctx) {}
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn owner(&self) -> usize {
        self.owner
    }

    pub fn program(&self) -> &[String] {
        &self.program
    }

    /// Stack rendered as strings, bottom first
    pub fn stack(&self) -> Vec<String> {
        self.stack.iter().map(Value::to_string).collect()
    }

    pub fn stack_values(&self) -> &[Value] {
        &self.stack
    }

    pub fn diagnostics(&self) -> &[ScriptError] {
        &self.diagnostics
    }

    /// Values printed with `.`
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn has_word(&self, name: &str) -> bool {
        self.words.contains_key(name)
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.var_index.get(name).and_then(|&a| self.variables.get(a))
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    // ========================================================================
    // DISPATCH
    // ========================================================================

    fn fail(&mut self, err: ScriptError) {
        if err.aborts_turn() {
            self.queue.clear();
            self.aborted = true;
        } else if err.clears_stack() {
            self.stack.clear();
        }
        tracing::warn!("Piece {} script: {}", self.owner, err);
        if self.diagnostics.len() < MAX_DIAGNOSTICS {
            self.diagnostics.push(err);
        }
    }

    fn execute(&mut self, token: &str, ctx: &mut TurnContext<'_>) -> Step {
        if let Some(word) = Word::lookup(token) {
            if word.is_restricted() && !self.play_mode {
                return Err(ScriptError::Restricted(token.to_string()));
            }
            return self.builtin(word, ctx);
        }

        if let Some(body) = self.words.get(token) {
            self.expansions += 1;
            if self.expansions > self.limits.max_expansions {
                return Err(ScriptError::ExpansionLimit(self.limits.max_expansions));
            }
            for t in body.iter().rev() {
                self.queue.push_front(t.clone());
            }
            return Ok(());
        }

        let value = match self.var_index.get(token) {
            Some(&addr) => Value::Address(addr),
            None => Value::literal(token),
        };
        self.stack.push(value);
        Ok(())
    }

    fn builtin(&mut self, word: Word, ctx: &mut TurnContext<'_>) -> Step {
        match word {
            Word::Add | Word::Sub | Word::Mul => {
                let [a, b] = self.ints(word)?;
                let result = match word {
                    Word::Add => a.checked_add(b),
                    Word::Sub => a.checked_sub(b),
                    _ => a.checked_mul(b),
                };
                let n = result.ok_or_else(|| ScriptError::Overflow(word.name().to_string()))?;
                self.stack.push(Value::Int(n));
            }
            Word::DivMod => {
                let [a, b] = self.ints(word)?;
                if b == 0 {
                    return Err(ScriptError::DivisionByZero(word.name().to_string()));
                }
                let overflow = || ScriptError::Overflow(word.name().to_string());
                let rem = a.checked_rem(b).ok_or_else(overflow)?;
                let quot = a.checked_div(b).ok_or_else(overflow)?;
                self.stack.push(Value::Int(rem));
                self.stack.push(Value::Int(quot));
            }

            Word::And | Word::Or => {
                let [a, b] = self.bools(word)?;
                let r = if word == Word::And { a && b } else { a || b };
                self.stack.push(Value::Bool(r));
            }
            Word::Invert => {
                let [a] = self.bools(word)?;
                self.stack.push(Value::Bool(!a));
            }

            Word::Dup => {
                let [a] = self.operands(word)?;
                self.stack.push(a.clone());
                self.stack.push(a);
            }
            Word::Drop => {
                self.operands::<1>(word)?;
            }
            Word::Swap => {
                let [a, b] = self.operands(word)?;
                self.stack.push(b);
                self.stack.push(a);
            }
            Word::Rot => {
                let [v3, v2, v1] = self.operands(word)?;
                self.stack.push(v2);
                self.stack.push(v1);
                self.stack.push(v3);
            }

            Word::Greater
            | Word::GreaterEq
            | Word::Less
            | Word::LessEq
            | Word::Equal
            | Word::NotEqual => self.compare(word)?,

            Word::If => self.conditional(word)?,
            Word::Begin => {
                let body = self.take_block(Word::Begin, Word::Until);
                self.begin_loop(&body, ctx)?;
            }
            Word::Do => {
                let body = self.take_block(Word::Do, Word::Loop);
                let [start, end] = self.ints(word)?;
                self.do_loop(start, end, &body, ctx)?;
            }
            Word::Leave => {
                if self.loop_depth == 0 {
                    return Err(ScriptError::NoLoop(word.name().to_string()));
                }
                self.queue.clear();
                self.leaving = true;
            }
            Word::Index => {
                let i = *self
                    .loops
                    .last()
                    .ok_or_else(|| ScriptError::NoLoop(word.name().to_string()))?;
                self.stack.push(Value::Int(i));
            }
            // Terminators are consumed with their blocks; strays do nothing
            Word::Else | Word::Then | Word::Until | Word::Loop | Word::EndDefine => {}

            Word::Variable => {
                let name = reserve(self.take_name(word)?)?;
                if !self.var_index.contains_key(&name) {
                    self.var_index.insert(name, self.variables.len());
                    self.variables.push(Value::Int(0));
                }
            }
            Word::Define => {
                let name = self.take_name(word)?;
                let body = self.take_block(Word::Define, Word::EndDefine);
                let name = reserve(name)?;
                self.words.insert(name, body);
            }
            Word::Store => {
                let [value, addr] = self.operands(word)?;
                let slot = self.address(word, &addr)?;
                self.variables[slot] = value;
            }
            Word::Fetch => {
                let [addr] = self.operands(word)?;
                let slot = self.address(word, &addr)?;
                self.stack.push(self.variables[slot].clone());
            }

            Word::Random => {
                let [n] = self.ints(word)?;
                let r = if n <= 0 { 0 } else { self.rng.gen_range(0..n) };
                self.stack.push(Value::Int(r));
            }
            Word::Print => {
                let [v] = self.operands(word)?;
                let text = v.to_string();
                tracing::info!("Piece {} prints {}", self.owner, text);
                if self.output.len() < MAX_OUTPUT {
                    self.output.push(text);
                }
            }

            Word::Health
            | Word::HealthLeft
            | Word::Moves
            | Word::MovesLeft
            | Word::Attack
            | Word::Range
            | Word::Team
            | Word::Kind => self.query(word, ctx),

            Word::Turn => {
                let [n] = self.ints(word)?;
                let facing = i64::from(ctx.board.piece(ctx.piece).facing);
                ctx.board.rotate_piece(ctx.piece, ((facing + n.rem_euclid(6)) % 6) as u8)?;
            }
            Word::Move => {
                let piece = ctx.board.piece(ctx.piece);
                let target = ctx.board.position(ctx.piece).neighbor(piece.facing);
                ctx.board.move_piece(ctx.piece, target)?;
            }
            Word::Shoot => {
                let [distance, direction] = self.ints(word)?;
                self.shoot(distance, direction, ctx)?;
            }
            Word::Check => {
                let [direction] = self.ints(word)?;
                let status = self.check(direction, ctx);
                self.stack.push(Value::from(status));
            }
            Word::Scan => {
                self.scan = ctx.board.scan_area(ctx.piece);
                self.stack.push(Value::Int(self.scan.len() as i64));
            }
            Word::Identify => {
                let [i] = self.ints(word)?;
                self.identify(i, ctx)?;
            }

            Word::Send => {
                let [message, recipient] = self.operands(word)?;
                let recipient = recipient.as_int().ok_or_else(|| mismatch(word, "an integer"))?;
                let ok = self.send(message, recipient, ctx);
                self.stack.push(Value::Bool(ok));
            }
            Word::HasMessage => {
                let [sender] = self.ints(word)?;
                let waiting = usize::try_from(sender).is_ok_and(|s| {
                    ctx.board.mailbox(ctx.piece).is_some_and(|mb| mb.has_from(s))
                });
                self.stack.push(Value::Bool(waiting));
            }
            Word::Receive => {
                let [sender] = self.ints(word)?;
                let message = usize::try_from(sender).ok().and_then(|s| {
                    ctx.board.mailbox_mut(ctx.piece).and_then(|mb| mb.take_from(s))
                });
                if let Some(m) = message {
                    self.stack.push(m);
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // OPERANDS
    // ========================================================================

    /// Pop the top `N` values, deepest first
    fn operands<const N: usize>(&mut self, word: Word) -> Result<[Value; N], ScriptError> {
        let found = self.stack.len();
        let underflow = || ScriptError::StackUnderflow {
            word: word.name().to_string(),
            needed: N,
            found,
        };
        if found < N {
            return Err(underflow());
        }
        self.stack.split_off(found - N).try_into().map_err(|_| underflow())
    }

    fn ints<const N: usize>(&mut self, word: Word) -> Result<[i64; N], ScriptError> {
        let values = self.operands::<N>(word)?;
        let mut out = [0; N];
        for (slot, v) in out.iter_mut().zip(&values) {
            *slot = v.as_int().ok_or_else(|| mismatch(word, "integers"))?;
        }
        Ok(out)
    }

    fn bools<const N: usize>(&mut self, word: Word) -> Result<[bool; N], ScriptError> {
        let values = self.operands::<N>(word)?;
        let mut out = [false; N];
        for (slot, v) in out.iter_mut().zip(&values) {
            *slot = v.as_bool().ok_or_else(|| mismatch(word, "booleans"))?;
        }
        Ok(out)
    }

    fn address(&self, word: Word, value: &Value) -> Result<usize, ScriptError> {
        match *value {
            Value::Address(a) if a < self.variables.len() => Ok(a),
            Value::Address(a) => Err(ScriptError::BadAddress(a)),
            _ => Err(mismatch(word, "a variable address")),
        }
    }

    fn compare(&mut self, word: Word) -> Step {
        let [a, b] = self.operands(word)?;
        if !a.is_comparable() || !b.is_comparable() {
            return Err(mismatch(word, "integers or strings"));
        }
        let ordering = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => x.cmp(y),
            _ => a.to_string().cmp(&b.to_string()),
        };
        let r = match word {
            Word::Greater => ordering.is_gt(),
            Word::GreaterEq => ordering.is_ge(),
            Word::Less => ordering.is_lt(),
            Word::LessEq => ordering.is_le(),
            Word::Equal => ordering.is_eq(),
            _ => ordering.is_ne(),
        };
        self.stack.push(Value::Bool(r));
        Ok(())
    }

    fn take_name(&mut self, word: Word) -> Result<String, ScriptError> {
        self.queue
            .pop_front()
            .ok_or_else(|| ScriptError::MissingName(word.name().to_string()))
    }

    // ========================================================================
    // CONTROL FLOW
    // ========================================================================

    /// Remove tokens up to the `close` matching an already consumed `open`.
    /// Without a match the block runs to the end of the queue.
    fn take_block(&mut self, open: Word, close: Word) -> Vec<String> {
        let mut body = Vec::new();
        let mut depth = 0usize;
        while let Some(token) = self.queue.pop_front() {
            if token == close.name() {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            } else if token == open.name() {
                depth += 1;
            }
            body.push(token);
        }
        body
    }

    /// `if ... else ... then`
    fn conditional(&mut self, word: Word) -> Step {
        let block = self.take_block(Word::If, Word::Then);

        let mut depth = 0usize;
        let split = block.iter().position(|t| {
            if t == Word::If.name() {
                depth += 1;
            } else if t == Word::Then.name() {
                depth = depth.saturating_sub(1);
            }
            depth == 0 && t == Word::Else.name()
        });
        let (then_branch, else_branch) = match split {
            Some(i) => (&block[..i], &block[i + 1..]),
            None => (&block[..], &block[block.len()..]),
        };

        let branch = match self.stack.pop() {
            Some(Value::Bool(true)) => then_branch,
            Some(Value::Bool(false)) => else_branch,
            Some(_) => return Err(mismatch(word, "a boolean")),
            None => {
                return Err(ScriptError::StackUnderflow {
                    word: word.name().to_string(),
                    needed: 1,
                    found: 0,
                })
            }
        };
        for t in branch.iter().rev() {
            self.queue.push_front(t.clone());
        }
        Ok(())
    }

    fn enter_loop(&mut self) -> Result<(Watchdog, VecDeque<String>), ScriptError> {
        if self.loop_depth >= MAX_LOOP_DEPTH {
            return Err(ScriptError::LoopDepth(MAX_LOOP_DEPTH));
        }
        self.loop_depth += 1;
        let watchdog = Watchdog::arm(self.limits.loop_timeout());
        Ok((watchdog, std::mem::take(&mut self.queue)))
    }

    fn exit_loop(&mut self, outer: VecDeque<String>) {
        self.loop_depth -= 1;
        self.leaving = false;
        if !self.aborted {
            self.queue = outer;
        }
    }

    /// One pass over a loop body. False once the loop has to stop.
    fn iterate(&mut self, body: &[String], ctx: &mut TurnContext<'_>) -> bool {
        self.queue = body.iter().cloned().collect();
        self.run(ctx);
        !(self.aborted || self.leaving)
    }

    /// `begin ... until`
    fn begin_loop(&mut self, body: &[String], ctx: &mut TurnContext<'_>) -> Step {
        let (watchdog, outer) = self.enter_loop()?;
        let mut result = Ok(());
        while self.iterate(body, ctx) {
            match self.stack.pop() {
                Some(Value::Bool(true)) => break,
                Some(Value::Bool(false)) => {}
                Some(_) => {
                    result = Err(mismatch(Word::Until, "a boolean"));
                    break;
                }
                None => {
                    result = Err(ScriptError::StackUnderflow {
                        word: Word::Until.name().to_string(),
                        needed: 1,
                        found: 0,
                    });
                    break;
                }
            }
            if watchdog.expired() {
                result = Err(ScriptError::LoopTimeout);
                break;
            }
        }
        self.exit_loop(outer);
        result
    }

    /// `do ... loop` over `start..=end`; once when `start >= end`
    fn do_loop(&mut self, start: i64, end: i64, body: &[String], ctx: &mut TurnContext<'_>) -> Step {
        let (watchdog, outer) = self.enter_loop()?;
        let last = end.max(start);
        let mut result = Ok(());
        let mut i = start;
        loop {
            self.loops.push(i);
            let more = self.iterate(body, ctx);
            self.loops.pop();
            if !more || i >= last {
                break;
            }
            if watchdog.expired() {
                result = Err(ScriptError::LoopTimeout);
                break;
            }
            i += 1;
        }
        self.exit_loop(outer);
        result
    }

    // ========================================================================
    // BOARD WORDS
    // ========================================================================

    fn query(&mut self, word: Word, ctx: &TurnContext<'_>) {
        let piece = ctx.board.piece(ctx.piece);
        let value = match word {
            Word::Health => Value::Int(i64::from(piece.health)),
            Word::HealthLeft => Value::Int(i64::from(piece.current_health)),
            Word::Moves => Value::Int(i64::from(piece.movement)),
            Word::MovesLeft => Value::Int(i64::from(piece.current_movement)),
            Word::Attack => Value::Int(i64::from(piece.attack)),
            Word::Range => Value::Int(i64::from(piece.range)),
            Word::Team => Value::Int(ctx.board.team_of(ctx.piece) as i64),
            _ => Value::from(piece.kind.name()),
        };
        self.stack.push(value);
    }

    fn shoot(&mut self, distance: i64, direction: i64, ctx: &mut TurnContext<'_>) -> Step {
        let piece = ctx.board.piece(ctx.piece);
        let from = ctx.board.position(ctx.piece);
        let out_of_range = ActionError::OutOfRange {
            distance: i32::try_from(distance).unwrap_or(i32::MAX),
            range: piece.range,
        };
        let ring = i32::try_from(distance).map_err(|_| out_of_range.clone())?;
        let relative = direction.rem_euclid(6 * i64::from(ring.max(1))) as i32;
        let target = ctx
            .board
            .directions()
            .relative_target(from, piece.facing, ring, relative)
            .ok_or(out_of_range)?;
        let shot = ctx.board.shoot_space(ctx.piece, target)?;
        tracing::debug!("Piece {} shot {} hitting {:?}", self.owner, shot.target_hex, shot.hidden);
        Ok(())
    }

    fn check(&self, direction: i64, ctx: &TurnContext<'_>) -> &'static str {
        let piece = ctx.board.piece(ctx.piece);
        let from = ctx.board.position(ctx.piece);
        let relative = direction.rem_euclid(6) as i32;
        match ctx.board.directions().relative_target(from, piece.facing, 1, relative) {
            Some(hex) if hex.is_in_bounds(ctx.board.side()) => {
                if ctx.board.scan_space(hex).is_empty() {
                    "EMPTY"
                } else {
                    "OCCUPIED"
                }
            }
            _ => "OUT_OF_BOUNDS",
        }
    }

    /// Push team, distance, relative direction and health of a scanned piece
    fn identify(&mut self, index: i64, ctx: &TurnContext<'_>) -> Step {
        let other = usize::try_from(index)
            .ok()
            .and_then(|i| self.scan.get(i).copied())
            .ok_or(ScriptError::BadScanIndex(index))?;

        let board = &*ctx.board;
        let me = board.piece(ctx.piece);
        let from = board.position(ctx.piece);
        let to = board.position(other);
        let direction = board.directions().relative(me.facing, from, to).map_or(0, i64::from);

        self.stack.push(Value::Int(board.team_of(other) as i64));
        self.stack.push(Value::Int(i64::from(from.distance(to))));
        self.stack.push(Value::Int(direction));
        self.stack.push(Value::Int(i64::from(board.piece(other).current_health)));
        Ok(())
    }

    /// Deliver to a teammate's mailbox by local index
    fn send(&self, message: Value, recipient: i64, ctx: &mut TurnContext<'_>) -> bool {
        let (team, sender) = ctx.board.split(ctx.piece);
        let Some(local) = usize::try_from(recipient)
            .ok()
            .filter(|&r| r < ctx.board.pieces_per_team())
        else {
            return false;
        };
        let target = ctx.board.offset(team, local);
        if !ctx.board.piece(target).alive {
            return false;
        }
        ctx.board
            .mailbox_mut(target)
            .is_some_and(|mb| mb.deliver(sender, message))
    }
}

/// Builtin names cannot be reused for words or variables
fn reserve(name: String) -> Result<String, ScriptError> {
    if Word::lookup(&name).is_some() {
        return Err(ScriptError::ReservedName(name));
    }
    Ok(name)
}

fn mismatch(word: Word, expected: &'static str) -> ScriptError {
    ScriptError::TypeMismatch {
        word: word.name().to_string(),
        expected,
    }
}

// ============================================================================
// TESTS
// ============================================================================
