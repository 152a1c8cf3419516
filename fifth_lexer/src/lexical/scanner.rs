//! The transition engine: resumable token assembly over classified input
//!
//! The scanner pulls one input unit at a time, classifies it, looks up the
//! next state in the transition table, and on a transition back to idle (or
//! to the end state) finalizes the pending token. It owns everything needed
//! to resume mid-token: the current state, partial accumulators, the sign
//! flag, and the position counters, so a logical input stream can be fed in
//! arbitrary chunks.

use crate::lexical::classify::classify;
use crate::lexical::table::{InputClass, LexerState, TransitionTable};
use crate::logging::codes;
use crate::tokens::{ScanResult, TextSlice, Token, TokenKind};
use crate::utils::{Position, Span};

/// Outcome of one `scan` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanStatus {
    /// The end state was reached; the result holds the full token sequence
    Completed,
    /// The buffer ran out mid-scan and this was not the final chunk
    NeedMoreInput,
    /// The scan failed; the same error is recorded in the result
    Failed(ScanError),
    /// The engine reached a dispatch combination the table cannot produce.
    /// Defensive only; indicates a construction bug, never expected.
    InvalidState,
}

/// Error record for a failed scan.
///
/// Created exactly once per failing scan and immutable after creation. The
/// `state` field is the state at the time of failure (the scanner's best
/// guess at what it was reading), `input` the rejecting input class, and
/// `raw` the input unit that caused the rejection (0 for the end-of-input
/// sentinel).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    #[error("unexpected {input} while scanning {state} at line {line}, column {column}")]
    Rejected {
        offset: usize,
        line: u32,
        column: u32,
        state: LexerState,
        input: InputClass,
        raw: u8,
    },

    #[error("integer literal exceeds the 64-bit signed range at line {line}, column {column}")]
    IntegerOverflow {
        offset: usize,
        line: u32,
        column: u32,
        state: LexerState,
        input: InputClass,
        raw: u8,
    },

    #[error("unterminated string literal at line {line}, column {column}")]
    UnterminatedString {
        offset: usize,
        line: u32,
        column: u32,
        state: LexerState,
    },

    #[error("scanner reached an invalid internal state while scanning {state}")]
    InvalidState { state: LexerState },
}

impl ScanError {
    /// State at the time of failure
    pub fn state(&self) -> LexerState {
        match self {
            ScanError::Rejected { state, .. }
            | ScanError::IntegerOverflow { state, .. }
            | ScanError::UnterminatedString { state, .. }
            | ScanError::InvalidState { state } => *state,
        }
    }

    /// Rejecting input class
    pub fn input_class(&self) -> InputClass {
        match self {
            ScanError::Rejected { input, .. } | ScanError::IntegerOverflow { input, .. } => *input,
            ScanError::UnterminatedString { .. } => InputClass::End,
            ScanError::InvalidState { .. } => InputClass::Other,
        }
    }

    /// Raw input unit that caused the rejection (0 for end-of-input)
    pub fn raw(&self) -> u8 {
        match self {
            ScanError::Rejected { raw, .. } | ScanError::IntegerOverflow { raw, .. } => *raw,
            _ => 0,
        }
    }

    /// Position of the failure in the source
    pub fn position(&self) -> Position {
        match self {
            ScanError::Rejected {
                offset,
                line,
                column,
                ..
            }
            | ScanError::IntegerOverflow {
                offset,
                line,
                column,
                ..
            }
            | ScanError::UnterminatedString {
                offset,
                line,
                column,
                ..
            } => Position::new(*offset, *line, (*column).max(1)),
            ScanError::InvalidState { .. } => Position::start(),
        }
    }

    pub fn error_code(&self) -> codes::Code {
        match self {
            ScanError::Rejected { state, .. } => match state {
                LexerState::Sign | LexerState::Int | LexerState::DotSeen | LexerState::Real => {
                    codes::lexical::INVALID_NUMBER
                }
                _ => codes::lexical::INVALID_CHARACTER,
            },
            ScanError::IntegerOverflow { .. } => codes::lexical::INTEGER_OVERFLOW,
            ScanError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            ScanError::InvalidState { .. } => codes::lexical::SCANNER_STATE_INVALID,
        }
    }
}

/// Resumable scanner over a logical input stream.
///
/// One `Scanner` pairs with one [`ScanResult`]: feed every chunk of the same
/// stream to the same scanner/result pair. The transition table itself is
/// shared and read-only; all per-scan state lives here.
#[derive(Debug)]
pub struct Scanner {
    state: LexerState,

    // position counters
    offset: usize,
    lines: u32,
    column: u32,
    pending_cr: bool,

    // token assembly
    negative: bool,
    sign_raw: u8,
    int_value: i64,
    frac_value: i64,
    frac_digits: u32,
    text_start: usize,
    token_start: Position,
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            state: LexerState::Idle,
            offset: 0,
            lines: 0,
            column: 0,
            pending_cr: false,
            negative: false,
            sign_raw: b'+',
            int_value: 0,
            frac_value: 0,
            frac_digits: 0,
            text_start: 0,
            token_start: Position::start(),
        }
    }

    /// Current lexer state
    pub fn state(&self) -> LexerState {
        self.state
    }

    /// Consume a chunk of the input stream.
    ///
    /// `last` marks the final chunk of the logical input; only then is the
    /// end-of-input sentinel fed to the automaton. The scan either
    /// completes, requests more input, or fails with the error recorded in
    /// `result`.
    pub fn scan(&mut self, chunk: &[u8], last: bool, result: &mut ScanResult) -> ScanStatus {
        match self.state {
            LexerState::End => return ScanStatus::Completed,
            LexerState::Error => {
                return match result.error.clone() {
                    Some(error) => ScanStatus::Failed(error),
                    None => ScanStatus::InvalidState,
                };
            }
            _ => {}
        }

        let table = TransitionTable::shared();
        let mut index = 0usize;

        loop {
            let unit = if index < chunk.len() {
                Some(chunk[index])
            } else if last {
                None
            } else {
                result.lines_processed = self.lines;
                return ScanStatus::NeedMoreInput;
            };

            let input = classify(unit);
            let next = table.next(self.state, input);
            let unit_offset = self.offset;

            self.track_line_ending(unit);
            if unit.is_some() {
                result.characters_processed += 1;
            }

            let prev = self.state;

            match next {
                LexerState::Error => {
                    let error = self.reject(prev, input, unit, unit_offset);
                    result.error = Some(error.clone());
                    result.lines_processed = self.lines;
                    self.state = LexerState::Error;
                    return ScanStatus::Failed(error);
                }

                LexerState::Idle => {
                    if prev != LexerState::Idle {
                        // token boundary: the delimiter ends the pending token
                        match self.finalize(prev, unit_offset, result) {
                            Ok(token) => result.push_token(token),
                            Err(status) => return status,
                        }
                    }
                    self.state = LexerState::Idle;
                }

                LexerState::Sign => {
                    // one boolean flag instead of separate plus/minus states
                    self.begin_token(unit_offset, result);
                    self.negative = unit == Some(b'-');
                    self.sign_raw = unit.unwrap_or(b'+');
                    self.state = LexerState::Sign;
                }

                LexerState::Int => {
                    if prev != LexerState::Int && prev != LexerState::Sign {
                        self.begin_token(unit_offset, result);
                    }
                    if let Some(byte) = unit {
                        if let Err(error) = self.append_int_digit(byte, unit_offset) {
                            result.error = Some(error.clone());
                            result.lines_processed = self.lines;
                            self.state = LexerState::Error;
                            return ScanStatus::Failed(error);
                        }
                    }
                    self.state = LexerState::Int;
                }

                LexerState::DotSeen => {
                    // transitional: a real requires a digit after the dot
                    if prev == LexerState::Idle {
                        self.begin_token(unit_offset, result);
                    }
                    self.state = LexerState::DotSeen;
                }

                LexerState::Real => {
                    if let Some(byte) = unit {
                        self.append_frac_digit(byte);
                    }
                    self.state = LexerState::Real;
                }

                LexerState::SingleQuoted | LexerState::DoubleQuoted => {
                    if prev == next {
                        // verbatim, no escape processing
                        if let Some(byte) = unit {
                            result.push_text_byte(byte);
                        }
                    } else {
                        // opening delimiter; not part of the stored text
                        self.begin_token(unit_offset, result);
                    }
                    self.state = next;
                }

                LexerState::Ident => {
                    if prev != LexerState::Ident {
                        self.begin_token(unit_offset, result);
                    }
                    if let Some(byte) = unit {
                        result.push_text_byte(byte);
                    }
                    self.state = LexerState::Ident;
                }

                LexerState::Debug => {
                    if prev != LexerState::Debug {
                        // entry on the colon; the colon is excluded from the name
                        self.begin_token(unit_offset, result);
                    } else if let Some(byte) = unit {
                        result.push_text_byte(byte);
                    }
                    self.state = LexerState::Debug;
                }

                LexerState::End => {
                    if prev.is_content() {
                        match self.finalize(prev, unit_offset, result) {
                            Ok(token) => result.push_token(token),
                            Err(status) => return status,
                        }
                    }
                    self.state = LexerState::End;
                    result.lines_processed = self.lines;
                    return ScanStatus::Completed;
                }
            }

            match unit {
                Some(_) => {
                    self.offset += 1;
                    index += 1;
                }
                // The sentinel always lands in end or error above; anything
                // else means the table lost its end-of-input edges.
                None => return ScanStatus::InvalidState,
            }
        }
    }

    /// Line-ending detection: LF, CR, and CR+LF each count one line break,
    /// doubled CR counts two, without detecting which convention the input
    /// uses. The end-of-input sentinel resolves a trailing CR.
    fn track_line_ending(&mut self, unit: Option<u8>) {
        match unit {
            Some(b'\n') => {
                self.pending_cr = false;
                self.lines += 1;
                self.column = 0;
            }
            Some(b'\r') => {
                if self.pending_cr {
                    self.lines += 1;
                    self.column = 0;
                } else {
                    self.pending_cr = true;
                }
            }
            Some(_) if self.pending_cr => {
                self.lines += 1;
                self.pending_cr = false;
                self.column = 0;
            }
            Some(_) => {
                self.column += 1;
            }
            None => {
                if self.pending_cr {
                    self.lines += 1;
                    self.pending_cr = false;
                    self.column = 0;
                }
            }
        }
    }

    /// Record the start of a token at the current unit and reset the
    /// accumulators. Text-carrying tokens accumulate from the current end
    /// of the result's text buffer.
    fn begin_token(&mut self, unit_offset: usize, result: &ScanResult) {
        self.token_start = Position::new(unit_offset, self.lines + 1, self.column.max(1));
        self.negative = false;
        self.int_value = 0;
        self.frac_value = 0;
        self.frac_digits = 0;
        self.text_start = result.text_len();
    }

    fn span_to(&self, end_offset: usize) -> Span {
        Span::new(
            self.token_start,
            Position::new(end_offset, self.lines + 1, self.column.max(1)),
        )
    }

    /// Append one digit to the integer accumulator. The magnitude
    /// accumulates positively and the sign applies at finalization, so
    /// anything past i64::MAX is an overflow.
    fn append_int_digit(&mut self, byte: u8, unit_offset: usize) -> Result<(), ScanError> {
        let digit = i64::from(byte - b'0');
        match self
            .int_value
            .checked_mul(10)
            .and_then(|value| value.checked_add(digit))
        {
            Some(value) => {
                self.int_value = value;
                Ok(())
            }
            None => Err(ScanError::IntegerOverflow {
                offset: unit_offset,
                line: self.lines + 1,
                column: self.column,
                state: LexerState::Int,
                input: InputClass::Digit,
                raw: byte,
            }),
        }
    }

    /// Append one mantissa digit. The fraction combines with the integral
    /// part only at finalization to avoid compounding floating-point error
    /// during accumulation. Digits past what the accumulator can hold are
    /// below double precision and are dropped.
    fn append_frac_digit(&mut self, byte: u8) {
        let digit = i64::from(byte - b'0');
        if let Some(value) = self
            .frac_value
            .checked_mul(10)
            .and_then(|value| value.checked_add(digit))
        {
            self.frac_value = value;
            self.frac_digits += 1;
        }
    }

    /// Emit the token for the content state being left. `delimiter_offset`
    /// is the absolute offset of the unit that ended the token.
    fn finalize(
        &mut self,
        prev: LexerState,
        delimiter_offset: usize,
        result: &mut ScanResult,
    ) -> Result<Token, ScanStatus> {
        let token = match prev {
            // A lone sign is an ordinary one-character word
            LexerState::Sign => {
                let start = result.text_len();
                result.push_text_byte(self.sign_raw);
                Token::text(
                    TokenKind::Identifier,
                    TextSlice::new(start, 1),
                    self.span_to(delimiter_offset),
                )
            }

            LexerState::Int => {
                let value = if self.negative {
                    -self.int_value
                } else {
                    self.int_value
                };
                Token::integer(value, self.span_to(delimiter_offset))
            }

            LexerState::Real => {
                let fraction = self.frac_value as f64 / 10f64.powi(self.frac_digits as i32);
                let mut value = self.int_value as f64 + fraction;
                if self.negative {
                    value = -value;
                }
                Token::real(value, self.span_to(delimiter_offset))
            }

            // The closing quote belongs to the lexeme but not the text
            LexerState::SingleQuoted | LexerState::DoubleQuoted => {
                let slice = TextSlice::new(self.text_start, result.text_len() - self.text_start);
                Token::text(TokenKind::Str, slice, self.span_to(delimiter_offset + 1))
            }

            LexerState::Ident => {
                let slice = TextSlice::new(self.text_start, result.text_len() - self.text_start);
                Token::text(TokenKind::Identifier, slice, self.span_to(delimiter_offset))
            }

            LexerState::Debug => {
                let slice = TextSlice::new(self.text_start, result.text_len() - self.text_start);
                Token::text(
                    TokenKind::DebugCommand,
                    slice,
                    self.span_to(delimiter_offset),
                )
            }

            // idle, end, error, and dot-seen never finalize; the table
            // routes dot-seen without a digit to the error state first
            _ => {
                let error = ScanError::InvalidState { state: prev };
                result.error = Some(error);
                return Err(ScanStatus::InvalidState);
            }
        };
        Ok(token)
    }

    fn reject(
        &self,
        state: LexerState,
        input: InputClass,
        unit: Option<u8>,
        unit_offset: usize,
    ) -> ScanError {
        let column = self.column + u32::from(unit.is_none());
        match (state, input) {
            (LexerState::SingleQuoted | LexerState::DoubleQuoted, InputClass::End) => {
                ScanError::UnterminatedString {
                    offset: unit_offset,
                    line: self.lines + 1,
                    column,
                    state,
                }
            }
            _ => ScanError::Rejected {
                offset: unit_offset,
                line: self.lines + 1,
                column,
                state,
                input,
                raw: unit.unwrap_or(0),
            },
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// Scan a whole buffer in one final chunk
    fn scan_all(input: &[u8]) -> (ScanStatus, ScanResult) {
        let mut scanner = Scanner::new();
        let mut result = ScanResult::with_capacity(input.len());
        let status = scanner.scan(input, true, &mut result);
        (status, result)
    }

    fn tokens_of(input: &[u8]) -> ScanResult {
        let (status, result) = scan_all(input);
        assert_eq!(status, ScanStatus::Completed, "input: {:?}", input);
        result
    }

    #[test]
    fn test_empty_input() {
        let (status, result) = scan_all(b"");
        assert_eq!(status, ScanStatus::Completed);
        assert!(result.is_empty());
        assert_eq!(result.characters_processed, 0);
    }

    #[test]
    fn test_whitespace_only() {
        let result = tokens_of(b"  \t \n ");
        assert!(result.is_empty());
        assert_eq!(result.characters_processed, 6);
        assert_eq!(result.lines_processed, 1);
    }

    #[test]
    fn test_integer_values_and_spans() {
        let result = tokens_of(b"42 +7 -15");
        let tokens = result.tokens();
        assert_eq!(tokens.len(), 3);

        assert_eq!(tokens[0].as_integer(), Some(42));
        assert_eq!(tokens[0].span.start.offset, 0);
        assert_eq!(tokens[0].span.end.offset, 2);

        assert_eq!(tokens[1].as_integer(), Some(7));
        assert_eq!(tokens[1].span.start.offset, 3);
        assert_eq!(tokens[1].span.end.offset, 5);

        assert_eq!(tokens[2].as_integer(), Some(-15));
        assert_eq!(tokens[2].span.start.offset, 6);
        assert_eq!(tokens[2].span.end.offset, 9);
    }

    #[test]
    fn test_integer_at_eof_finalized() {
        let result = tokens_of(b"123");
        assert_eq!(result.tokens().len(), 1);
        assert_eq!(result.tokens()[0].as_integer(), Some(123));
        assert_eq!(result.tokens()[0].span.end.offset, 3);
    }

    #[test]
    fn test_real_values() {
        let result = tokens_of(b"3.14 -2.718 .5 +.25");
        let tokens = result.tokens();
        assert_eq!(tokens.len(), 4);
        assert!((tokens[0].as_real().unwrap() - 3.14).abs() < 1e-12);
        assert!((tokens[1].as_real().unwrap() - -2.718).abs() < 1e-12);
        assert!((tokens[2].as_real().unwrap() - 0.5).abs() < 1e-12);
        assert!((tokens[3].as_real().unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_integer_then_dot_is_real() {
        let result = tokens_of(b"12.5");
        assert_eq!(result.tokens().len(), 1);
        assert_eq!(result.tokens()[0].kind, TokenKind::Real);
        assert!((result.tokens()[0].as_real().unwrap() - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_strings_verbatim() {
        let result = tokens_of(b"'apple' \"ball\"");
        let tokens = result.tokens();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(result.text_of(&tokens[0]), Some(&b"apple"[..]));
        assert_eq!(result.text_of(&tokens[1]), Some(&b"ball"[..]));
        // Spans include both delimiters
        assert_eq!(tokens[0].span.start.offset, 0);
        assert_eq!(tokens[0].span.end.offset, 7);
    }

    #[test]
    fn test_string_contains_other_quote_and_whitespace() {
        let result = tokens_of(b"'a \"b\" c'");
        assert_eq!(result.tokens().len(), 1);
        assert_eq!(result.text_of(&result.tokens()[0]), Some(&b"a \"b\" c"[..]));
    }

    #[test]
    fn test_string_no_escape_processing() {
        let result = tokens_of(b"'a\\nb'");
        assert_eq!(result.text_of(&result.tokens()[0]), Some(&b"a\\nb"[..]));
    }

    #[test]
    fn test_empty_string() {
        let result = tokens_of(b"''");
        assert_eq!(result.tokens().len(), 1);
        assert_eq!(result.text_of(&result.tokens()[0]), Some(&b""[..]));
    }

    #[test]
    fn test_identifiers() {
        let result = tokens_of(b"apple_1 * / print_stack_top");
        let tokens = result.tokens();
        assert_eq!(tokens.len(), 4);
        for token in tokens {
            assert_eq!(token.kind, TokenKind::Identifier);
        }
        assert_eq!(result.text_of(&tokens[0]), Some(&b"apple_1"[..]));
        assert_eq!(result.text_of(&tokens[1]), Some(&b"*"[..]));
        assert_eq!(result.text_of(&tokens[2]), Some(&b"/"[..]));
        assert_eq!(result.text_of(&tokens[3]), Some(&b"print_stack_top"[..]));
    }

    #[test]
    fn test_identifier_with_digits() {
        let result = tokens_of(b"a1b2");
        assert_eq!(result.tokens()[0].kind, TokenKind::Identifier);
        assert_eq!(result.text_of(&result.tokens()[0]), Some(&b"a1b2"[..]));
    }

    #[test]
    fn test_lone_sign_is_identifier() {
        let result = tokens_of(b"+ -");
        let tokens = result.tokens();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(result.text_of(&tokens[0]), Some(&b"+"[..]));
        assert_eq!(result.text_of(&tokens[1]), Some(&b"-"[..]));
        assert_eq!(tokens[0].span.start.offset, 0);
        assert_eq!(tokens[0].span.end.offset, 1);
    }

    #[test]
    fn test_debug_command_excludes_colon() {
        let result = tokens_of(b":break :stack_trace2");
        let tokens = result.tokens();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::DebugCommand);
        assert_eq!(result.text_of(&tokens[0]), Some(&b"break"[..]));
        assert_eq!(result.text_of(&tokens[1]), Some(&b"stack_trace2"[..]));
        // Span still covers the colon
        assert_eq!(tokens[0].span.start.offset, 0);
        assert_eq!(tokens[0].span.end.offset, 6);
    }

    #[test]
    fn test_forth_statement() {
        let result = tokens_of(b"1 2 + print_stack_top");
        let kinds: Vec<TokenKind> = result.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Integer,
                TokenKind::Integer,
                TokenKind::Identifier,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_error_position_letter_in_integer() {
        let (status, result) = scan_all(b"12a3");
        let error = match status {
            ScanStatus::Failed(error) => error,
            other => panic!("expected failure, got {:?}", other),
        };
        assert_matches!(error, ScanError::Rejected { .. });
        assert_eq!(error.position().offset, 2);
        assert_eq!(error.position().line, 1);
        assert_eq!(error.position().column, 3);
        assert_eq!(error.state(), LexerState::Int);
        assert_eq!(error.input_class(), InputClass::Alphabetic);
        assert_eq!(error.raw(), b'a');
        assert_eq!(result.error, Some(error));
    }

    #[test]
    fn test_integer_overflow_rejected() {
        let input = b"99999999999999999999"; // twenty nines
        let (status, result) = scan_all(input);
        assert_matches!(status, ScanStatus::Failed(ScanError::IntegerOverflow { .. }));
        assert!(result.has_error());
        assert!(result.tokens().is_empty());
    }

    #[test]
    fn test_i64_max_is_accepted() {
        let result = tokens_of(b"9223372036854775807");
        assert_eq!(result.tokens()[0].as_integer(), Some(i64::MAX));
    }

    #[test]
    fn test_second_dot_rejected() {
        let (status, _) = scan_all(b"1.2.3");
        let error = match status {
            ScanStatus::Failed(error) => error,
            other => panic!("expected failure, got {:?}", other),
        };
        assert_eq!(error.state(), LexerState::Real);
        assert_eq!(error.input_class(), InputClass::Dot);
    }

    #[test]
    fn test_trailing_dot_rejected() {
        let (status, _) = scan_all(b"12.");
        assert_matches!(status, ScanStatus::Failed(ScanError::Rejected { .. }));

        let (status, _) = scan_all(b"12. ");
        let error = match status {
            ScanStatus::Failed(error) => error,
            other => panic!("expected failure, got {:?}", other),
        };
        assert_eq!(error.state(), LexerState::DotSeen);
        assert_eq!(error.input_class(), InputClass::Whitespace);
    }

    #[test]
    fn test_lone_dot_rejected() {
        let (status, _) = scan_all(b".");
        assert_matches!(status, ScanStatus::Failed(ScanError::Rejected { .. }));
    }

    #[test]
    fn test_unterminated_string() {
        let (status, _) = scan_all(b"'no closing quote");
        let error = match status {
            ScanStatus::Failed(error) => error,
            other => panic!("expected failure, got {:?}", other),
        };
        assert_matches!(error, ScanError::UnterminatedString { .. });
        assert_eq!(error.state(), LexerState::SingleQuoted);
        assert_eq!(error.input_class(), InputClass::End);
        assert_eq!(error.error_code().as_str(), "E021");
    }

    #[test]
    fn test_line_counting_mixed_endings() {
        // CRLF, lone CR, and lone LF each count exactly one line break
        let result = tokens_of(b"a\r\nb\rc\nd");
        assert_eq!(result.lines_processed, 3);
        assert_eq!(result.tokens().len(), 4);
    }

    #[test]
    fn test_doubled_cr_counts_two_lines() {
        let result = tokens_of(b"a\r\rb");
        assert_eq!(result.lines_processed, 2);
    }

    #[test]
    fn test_trailing_cr_counts_one_line() {
        let result = tokens_of(b"a\r");
        assert_eq!(result.lines_processed, 1);
    }

    #[test]
    fn test_error_line_numbers_across_lines() {
        let (status, _) = scan_all(b"ok\n12x");
        let error = match status {
            ScanStatus::Failed(error) => error,
            other => panic!("expected failure, got {:?}", other),
        };
        assert_eq!(error.position().line, 2);
        assert_eq!(error.position().offset, 5);
    }

    #[test]
    fn test_embedded_nul_ends_scan() {
        let mut scanner = Scanner::new();
        let mut result = ScanResult::new();
        let status = scanner.scan(b"12\0 34", false, &mut result);
        assert_eq!(status, ScanStatus::Completed);
        assert_eq!(result.tokens().len(), 1);
        assert_eq!(result.tokens()[0].as_integer(), Some(12));
    }

    #[test]
    fn test_need_more_input_then_resume() {
        let mut scanner = Scanner::new();
        let mut result = ScanResult::new();

        let status = scanner.scan(b"12 3", false, &mut result);
        assert_eq!(status, ScanStatus::NeedMoreInput);
        assert_eq!(result.tokens().len(), 1);

        let status = scanner.scan(b"4 'ab", false, &mut result);
        assert_eq!(status, ScanStatus::NeedMoreInput);

        let status = scanner.scan(b"c'", true, &mut result);
        assert_eq!(status, ScanStatus::Completed);

        let tokens = result.tokens();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].as_integer(), Some(12));
        assert_eq!(tokens[1].as_integer(), Some(34));
        assert_eq!(result.text_of(&tokens[2]), Some(&b"abc"[..]));
    }

    #[test]
    fn test_resumability_at_every_split_point() {
        let input: &[u8] = b"-12 3.5 'a b' ident :dbg + .25";
        let (status, whole) = scan_all(input);
        assert_eq!(status, ScanStatus::Completed);

        for split in 0..=input.len() {
            let mut scanner = Scanner::new();
            let mut result = ScanResult::new();

            let first = scanner.scan(&input[..split], false, &mut result);
            assert_ne!(
                first,
                ScanStatus::Completed,
                "must not complete before the final chunk (split {})",
                split
            );
            let second = scanner.scan(&input[split..], true, &mut result);
            assert_eq!(second, ScanStatus::Completed, "split {}", split);

            assert_eq!(result.tokens().len(), whole.tokens().len(), "split {}", split);
            for (a, b) in whole.iter().zip(result.iter()) {
                assert_eq!(a.kind, b.kind, "split {}", split);
                assert_eq!(a.span, b.span, "split {}", split);
                assert_eq!(whole.text_of(a), result.text_of(b), "split {}", split);
                match (a.value, b.value) {
                    (crate::tokens::TokenValue::Integer(x), crate::tokens::TokenValue::Integer(y)) => {
                        assert_eq!(x, y)
                    }
                    (crate::tokens::TokenValue::Real(x), crate::tokens::TokenValue::Real(y)) => {
                        assert!((x - y).abs() < 1e-12)
                    }
                    _ => {}
                }
            }
            assert_eq!(
                result.characters_processed, whole.characters_processed,
                "split {}",
                split
            );
            assert_eq!(result.lines_processed, whole.lines_processed, "split {}", split);
        }
    }

    #[test]
    fn test_idempotent_reconstruction() {
        let input: &[u8] = b"1 2 + 3.5 'str' name :cmd -7";
        let first = tokens_of(input);

        // Rejoin the tokens with single spaces and re-scan
        let mut rebuilt: Vec<u8> = Vec::new();
        for token in first.iter() {
            if !rebuilt.is_empty() {
                rebuilt.push(b' ');
            }
            match token.kind {
                TokenKind::Integer => {
                    rebuilt.extend(token.as_integer().unwrap().to_string().bytes())
                }
                TokenKind::Real => rebuilt.extend(token.as_real().unwrap().to_string().bytes()),
                TokenKind::Str => {
                    rebuilt.push(b'\'');
                    rebuilt.extend(first.text_of(token).unwrap());
                    rebuilt.push(b'\'');
                }
                TokenKind::Identifier => rebuilt.extend(first.text_of(token).unwrap()),
                TokenKind::DebugCommand => {
                    rebuilt.push(b':');
                    rebuilt.extend(first.text_of(token).unwrap());
                }
            }
        }

        let second = tokens_of(&rebuilt);
        assert_eq!(first.tokens().len(), second.tokens().len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(first.text_of(a), second.text_of(b));
            assert_eq!(a.as_integer(), b.as_integer());
            match (a.as_real(), b.as_real()) {
                (Some(x), Some(y)) => assert!((x - y).abs() < 1e-12),
                (None, None) => {}
                other => panic!("mismatched real payloads: {:?}", other),
            }
        }
    }

    #[test]
    fn test_scan_after_completion_is_idempotent() {
        let mut scanner = Scanner::new();
        let mut result = ScanResult::new();
        assert_eq!(scanner.scan(b"1", true, &mut result), ScanStatus::Completed);
        assert_eq!(scanner.scan(b"", true, &mut result), ScanStatus::Completed);
        assert_eq!(result.tokens().len(), 1);
    }

    #[test]
    fn test_scan_after_failure_reports_same_error() {
        let mut scanner = Scanner::new();
        let mut result = ScanResult::new();
        let first = scanner.scan(b"12a", true, &mut result);
        let second = scanner.scan(b"", true, &mut result);
        assert_eq!(first, second);
    }

    #[test]
    fn test_control_character_rejected_at_idle() {
        let (status, _) = scan_all(&[0x01]);
        let error = match status {
            ScanStatus::Failed(error) => error,
            other => panic!("expected failure, got {:?}", other),
        };
        assert_eq!(error.state(), LexerState::Idle);
        assert_eq!(error.input_class(), InputClass::Other);
        assert_eq!(error.error_code().as_str(), "E020");
    }

    #[test]
    fn test_backslash_reserved() {
        let (status, _) = scan_all(b"\\");
        assert_matches!(status, ScanStatus::Failed(ScanError::Rejected { .. }));
    }

    #[test]
    fn test_sign_then_letter_rejected() {
        let (status, _) = scan_all(b"+foo");
        let error = match status {
            ScanStatus::Failed(error) => error,
            other => panic!("expected failure, got {:?}", other),
        };
        assert_eq!(error.state(), LexerState::Sign);
        assert_eq!(error.error_code().as_str(), "E022");
    }

    #[test]
    fn test_long_fraction_does_not_overflow() {
        // More mantissa digits than the accumulator holds; the tail is
        // below double precision and must not fail the scan
        let result = tokens_of(b"0.12345678901234567890123456789");
        let value = result.tokens()[0].as_real().unwrap();
        assert!((value - 0.123456789012345678).abs() < 1e-15);
    }

    #[test]
    fn test_error_display_mentions_position() {
        let (status, _) = scan_all(b"12a3");
        if let ScanStatus::Failed(error) = status {
            let message = error.to_string();
            assert!(message.contains("line 1"));
            assert!(message.contains("column 3"));
        } else {
            panic!("expected failure");
        }
    }
}
