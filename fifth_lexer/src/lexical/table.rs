//! Lexer states, input classes, and the state transition table
//!
//! The tokenizer is a deterministic finite automaton: a fixed
//! (state x input class) -> next state mapping, built once and shared by
//! every scan. Any pair without an explicitly assigned transition routes to
//! the error state; that default is how malformed input (a letter inside a
//! numeric literal, a second dot in a real) gets rejected.

use std::fmt;
use std::sync::OnceLock;

/// States of the tokenizer automaton.
///
/// Single- and double-quoted strings get separate states so the automaton
/// does not need a side variable to remember which delimiter closes the
/// current literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LexerState {
    Error = 0,
    Idle = 1,
    Sign = 2,
    Int = 3,
    DotSeen = 4,
    Real = 5,
    SingleQuoted = 6,
    DoubleQuoted = 7,
    Ident = 8,
    Debug = 9,
    End = 10,
}

pub const STATE_COUNT: usize = 11;

impl LexerState {
    pub const ALL: [LexerState; STATE_COUNT] = [
        LexerState::Error,
        LexerState::Idle,
        LexerState::Sign,
        LexerState::Int,
        LexerState::DotSeen,
        LexerState::Real,
        LexerState::SingleQuoted,
        LexerState::DoubleQuoted,
        LexerState::Ident,
        LexerState::Debug,
        LexerState::End,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LexerState::Error => "error",
            LexerState::Idle => "idle",
            LexerState::Sign => "sign",
            LexerState::Int => "integer",
            LexerState::DotSeen => "dot",
            LexerState::Real => "real",
            LexerState::SingleQuoted => "single-quoted string",
            LexerState::DoubleQuoted => "double-quoted string",
            LexerState::Ident => "identifier",
            LexerState::Debug => "debug command",
            LexerState::End => "end",
        }
    }

    /// States that accumulate token content while current
    pub fn is_content(&self) -> bool {
        matches!(
            self,
            LexerState::Sign
                | LexerState::Int
                | LexerState::DotSeen
                | LexerState::Real
                | LexerState::SingleQuoted
                | LexerState::DoubleQuoted
                | LexerState::Ident
                | LexerState::Debug
        )
    }

    /// States with no outgoing edges back into content accumulation
    pub fn is_terminal(&self) -> bool {
        matches!(self, LexerState::Error | LexerState::End)
    }
}

impl fmt::Display for LexerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input alphabet of the automaton.
///
/// `Backslash` is reserved for a future escape notation and currently has
/// no non-error transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InputClass {
    End = 0,
    Whitespace = 1,
    Alphabetic = 2,
    Digit = 3,
    Dot = 4,
    DoubleQuote = 5,
    SingleQuote = 6,
    Sign = 7,
    Colon = 8,
    Backslash = 9,
    Visible = 10,
    Other = 11,
}

pub const INPUT_CLASS_COUNT: usize = 12;

impl InputClass {
    pub const ALL: [InputClass; INPUT_CLASS_COUNT] = [
        InputClass::End,
        InputClass::Whitespace,
        InputClass::Alphabetic,
        InputClass::Digit,
        InputClass::Dot,
        InputClass::DoubleQuote,
        InputClass::SingleQuote,
        InputClass::Sign,
        InputClass::Colon,
        InputClass::Backslash,
        InputClass::Visible,
        InputClass::Other,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputClass::End => "end-of-input",
            InputClass::Whitespace => "whitespace",
            InputClass::Alphabetic => "letter",
            InputClass::Digit => "digit",
            InputClass::Dot => "dot",
            InputClass::DoubleQuote => "double quote",
            InputClass::SingleQuote => "single quote",
            InputClass::Sign => "sign",
            InputClass::Colon => "colon",
            InputClass::Backslash => "backslash",
            InputClass::Visible => "visible symbol",
            InputClass::Other => "other",
        }
    }
}

impl fmt::Display for InputClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The precomputed (state x input class) -> next-state mapping.
///
/// Read-only after construction and shared by all scans.
pub struct TransitionTable {
    cells: [[LexerState; INPUT_CLASS_COUNT]; STATE_COUNT],
}

static TABLE: OnceLock<TransitionTable> = OnceLock::new();

impl TransitionTable {
    /// The process-wide shared table
    pub fn shared() -> &'static TransitionTable {
        TABLE.get_or_init(TransitionTable::build)
    }

    /// Look up the next state for the current state and input class
    pub fn next(&self, state: LexerState, input: InputClass) -> LexerState {
        self.cells[state.index()][input.index()]
    }

    /// Input classes the given state accepts (non-error transitions).
    /// Used by diagnostics to describe expected-vs-found input.
    pub fn expected_inputs(&self, state: LexerState) -> Vec<InputClass> {
        InputClass::ALL
            .iter()
            .copied()
            .filter(|input| self.next(state, *input) != LexerState::Error)
            .collect()
    }

    /// Check the automaton invariants: end/error are absorbing, and from
    /// every content state idle or end stays reachable through non-error
    /// edges (every content state is escapable; dot-seen escapes through
    /// real). Called at startup; a failure means the table constructor is
    /// broken, not the input.
    pub fn validate(&self) -> Result<(), String> {
        for state in LexerState::ALL {
            if state.is_content() && !self.can_escape(state) {
                return Err(format!("content state '{}' cannot reach idle or end", state));
            }
            if state.is_terminal() {
                for input in InputClass::ALL {
                    if self.next(state, input) != LexerState::Error {
                        return Err(format!("terminal state '{}' has an outgoing edge", state));
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether idle or end is reachable from `state` via non-error edges
    fn can_escape(&self, state: LexerState) -> bool {
        let mut visited = [false; STATE_COUNT];
        let mut stack = vec![state];
        while let Some(current) = stack.pop() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;
            for input in InputClass::ALL {
                match self.next(current, input) {
                    LexerState::Idle | LexerState::End => return true,
                    LexerState::Error => {}
                    next => stack.push(next),
                }
            }
        }
        false
    }

    fn build() -> Self {
        use InputClass as In;
        use LexerState as St;

        // Every cell defaults to the error state; only listed transitions
        // are legal.
        let mut cells = [[St::Error; INPUT_CLASS_COUNT]; STATE_COUNT];

        let mut set = |from: LexerState, input: InputClass, to: LexerState| {
            cells[from.index()][input.index()] = to;
        };

        // idle: dispatch on the first unit of a token
        set(St::Idle, In::End, St::End);
        set(St::Idle, In::Whitespace, St::Idle);
        set(St::Idle, In::Alphabetic, St::Ident);
        set(St::Idle, In::Digit, St::Int);
        set(St::Idle, In::Dot, St::DotSeen);
        set(St::Idle, In::DoubleQuote, St::DoubleQuoted);
        set(St::Idle, In::SingleQuote, St::SingleQuoted);
        set(St::Idle, In::Sign, St::Sign);
        set(St::Idle, In::Colon, St::Debug);
        set(St::Idle, In::Visible, St::Ident);

        // sign: a pending +/-, must be followed by a digit, a dot, or a
        // delimiter (a lone sign finalizes as an identifier)
        set(St::Sign, In::End, St::End);
        set(St::Sign, In::Whitespace, St::Idle);
        set(St::Sign, In::Digit, St::Int);
        set(St::Sign, In::Dot, St::DotSeen);

        // integer
        set(St::Int, In::End, St::End);
        set(St::Int, In::Whitespace, St::Idle);
        set(St::Int, In::Digit, St::Int);
        set(St::Int, In::Dot, St::DotSeen);

        // dot-seen: requires a digit before committing to a real
        set(St::DotSeen, In::Digit, St::Real);

        // real
        set(St::Real, In::End, St::End);
        set(St::Real, In::Whitespace, St::Idle);
        set(St::Real, In::Digit, St::Real);

        // strings: self-loop on everything except the matching quote;
        // end-of-input inside a string stays an error (unterminated)
        for input in InputClass::ALL {
            if input != In::End {
                set(St::DoubleQuoted, input, St::DoubleQuoted);
                set(St::SingleQuoted, input, St::SingleQuoted);
            }
        }
        set(St::DoubleQuoted, In::DoubleQuote, St::Idle);
        set(St::SingleQuoted, In::SingleQuote, St::Idle);

        // identifier
        set(St::Ident, In::End, St::End);
        set(St::Ident, In::Whitespace, St::Idle);
        set(St::Ident, In::Alphabetic, St::Ident);
        set(St::Ident, In::Digit, St::Ident);
        set(St::Ident, In::Visible, St::Ident);

        // debug command: colon followed by alphanumerics/underscore
        set(St::Debug, In::End, St::End);
        set(St::Debug, In::Whitespace, St::Idle);
        set(St::Debug, In::Alphabetic, St::Debug);
        set(St::Debug, In::Digit, St::Debug);

        TransitionTable { cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_validates() {
        assert!(TransitionTable::shared().validate().is_ok());
    }

    #[test]
    fn test_idle_dispatch() {
        let table = TransitionTable::shared();
        assert_eq!(table.next(LexerState::Idle, InputClass::Digit), LexerState::Int);
        assert_eq!(
            table.next(LexerState::Idle, InputClass::Alphabetic),
            LexerState::Ident
        );
        assert_eq!(
            table.next(LexerState::Idle, InputClass::Visible),
            LexerState::Ident
        );
        assert_eq!(
            table.next(LexerState::Idle, InputClass::Colon),
            LexerState::Debug
        );
        assert_eq!(
            table.next(LexerState::Idle, InputClass::Whitespace),
            LexerState::Idle
        );
        assert_eq!(table.next(LexerState::Idle, InputClass::End), LexerState::End);
    }

    #[test]
    fn test_undefined_pairs_reject() {
        let table = TransitionTable::shared();
        // Letter inside an integer
        assert_eq!(
            table.next(LexerState::Int, InputClass::Alphabetic),
            LexerState::Error
        );
        // Second dot in a real
        assert_eq!(table.next(LexerState::Real, InputClass::Dot), LexerState::Error);
        // Backslash is reserved
        assert_eq!(
            table.next(LexerState::Idle, InputClass::Backslash),
            LexerState::Error
        );
        // Dot must be followed by a digit
        assert_eq!(
            table.next(LexerState::DotSeen, InputClass::Whitespace),
            LexerState::Error
        );
        assert_eq!(
            table.next(LexerState::DotSeen, InputClass::End),
            LexerState::Error
        );
    }

    #[test]
    fn test_strings_accept_everything_but_end() {
        let table = TransitionTable::shared();
        for input in InputClass::ALL {
            let next = table.next(LexerState::DoubleQuoted, input);
            match input {
                InputClass::End => assert_eq!(next, LexerState::Error),
                InputClass::DoubleQuote => assert_eq!(next, LexerState::Idle),
                _ => assert_eq!(next, LexerState::DoubleQuoted),
            }
        }
        // Single-quoted strings may contain double quotes and vice versa
        assert_eq!(
            table.next(LexerState::SingleQuoted, InputClass::DoubleQuote),
            LexerState::SingleQuoted
        );
        assert_eq!(
            table.next(LexerState::DoubleQuoted, InputClass::SingleQuote),
            LexerState::DoubleQuoted
        );
    }

    #[test]
    fn test_content_states_reach_end_on_eof() {
        let table = TransitionTable::shared();
        for state in [
            LexerState::Sign,
            LexerState::Int,
            LexerState::Real,
            LexerState::Ident,
            LexerState::Debug,
        ] {
            assert_eq!(table.next(state, InputClass::End), LexerState::End);
        }
        // Strings have no valid completion without their closing delimiter
        assert_eq!(
            table.next(LexerState::SingleQuoted, InputClass::End),
            LexerState::Error
        );
        assert_eq!(
            table.next(LexerState::DoubleQuoted, InputClass::End),
            LexerState::Error
        );
    }

    #[test]
    fn test_expected_inputs() {
        let table = TransitionTable::shared();
        let expected = table.expected_inputs(LexerState::DotSeen);
        assert_eq!(expected, vec![InputClass::Digit]);

        let expected = table.expected_inputs(LexerState::Int);
        assert!(expected.contains(&InputClass::Digit));
        assert!(expected.contains(&InputClass::Dot));
        assert!(expected.contains(&InputClass::Whitespace));
        assert!(!expected.contains(&InputClass::Alphabetic));
    }

    #[test]
    fn test_terminal_states_absorbing() {
        let table = TransitionTable::shared();
        for input in InputClass::ALL {
            assert_eq!(table.next(LexerState::Error, input), LexerState::Error);
            assert_eq!(table.next(LexerState::End, input), LexerState::Error);
        }
    }

    #[test]
    fn test_state_and_class_indices_are_dense() {
        for (i, state) in LexerState::ALL.iter().enumerate() {
            assert_eq!(state.index(), i);
        }
        for (i, input) in InputClass::ALL.iter().enumerate() {
            assert_eq!(input.index(), i);
        }
    }
}
