//! Lexical analysis for Fifth source text
//!
//! Converts a raw byte stream into a sequence of classified tokens with
//! source positions. The core is a deterministic finite automaton over a
//! classified input alphabet: [`classify`] maps each input unit to an
//! [`InputClass`], [`TransitionTable`] decides the next [`LexerState`], and
//! [`Scanner`] drives the table over a buffer, assembling tokens and
//! tracking line/column positions across mixed line-ending conventions.
//!
//! The scanner is resumable: a logical input stream may be fed in chunks,
//! with the scanner carrying its state (and partial token accumulation)
//! across calls. [`LexicalAnalyzer`] layers file context, metrics, logging,
//! and resource limits on top.

pub mod analyzer;
pub mod classify;
pub mod scanner;
pub mod table;

use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::tokens::ScanResult;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};
pub use classify::classify;
pub use scanner::{ScanError, ScanStatus, Scanner};
pub use table::{InputClass, LexerState, TransitionTable};

// ============================================================================
// MODULE API
// ============================================================================

/// Tokenize a processed file with default preferences
pub fn tokenize_file_result(file_result: &FileProcessingResult) -> Result<ScanResult, LexerError> {
    let mut analyzer = LexicalAnalyzer::new();
    analyzer.tokenize_file_result(file_result)
}

/// Tokenize with custom runtime preferences
pub fn tokenize_file_result_with_preferences(
    file_result: &FileProcessingResult,
    preferences: LexicalPreferences,
) -> Result<ScanResult, LexerError> {
    let mut analyzer = LexicalAnalyzer::with_preferences(preferences);
    analyzer.tokenize_file_result(file_result)
}

/// Tokenize an in-memory buffer as a complete input stream.
///
/// Convenience for callers that are not going through the file processor;
/// drives the scanner in a single final chunk without limit enforcement.
pub fn tokenize_bytes(input: &[u8]) -> Result<ScanResult, ScanError> {
    let mut scanner = Scanner::new();
    let mut result = ScanResult::with_capacity(input.len());
    match scanner.scan(input, true, &mut result) {
        ScanStatus::Completed => Ok(result),
        ScanStatus::Failed(error) => Err(error),
        ScanStatus::NeedMoreInput | ScanStatus::InvalidState => Err(ScanError::InvalidState {
            state: scanner.state(),
        }),
    }
}

/// Create a new lexical analyzer with default preferences
pub fn create_analyzer() -> LexicalAnalyzer {
    LexicalAnalyzer::new()
}

/// Create analyzer with custom runtime preferences
pub fn create_analyzer_with_preferences(preferences: LexicalPreferences) -> LexicalAnalyzer {
    LexicalAnalyzer::with_preferences(preferences)
}

// ============================================================================
// MODULE INITIALIZATION AND VALIDATION
// ============================================================================

/// Validate the tokenizer machinery at startup: the transition table must
/// hold its invariants and every lexical error code must be registered.
pub fn validate_tokenization() -> Result<(), String> {
    TransitionTable::shared().validate()?;

    let test_codes = [
        crate::logging::codes::lexical::INVALID_CHARACTER,
        crate::logging::codes::lexical::UNTERMINATED_STRING,
        crate::logging::codes::lexical::INVALID_NUMBER,
        crate::logging::codes::lexical::INTEGER_OVERFLOW,
        crate::logging::codes::lexical::SCANNER_STATE_INVALID,
        crate::logging::codes::lexical::IDENTIFIER_TOO_LONG,
        crate::logging::codes::lexical::STRING_TOO_LARGE,
        crate::logging::codes::lexical::TOO_MANY_TOKENS,
    ];

    for code in &test_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    #[test]
    fn test_validate_tokenization() {
        assert!(validate_tokenization().is_ok());
    }

    #[test]
    fn test_tokenize_bytes() {
        let result = tokenize_bytes(b"2 4 3 + * print_stack_top").unwrap();
        let kinds: Vec<TokenKind> = result.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Integer,
                TokenKind::Integer,
                TokenKind::Integer,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_tokenize_bytes_error() {
        assert!(tokenize_bytes(b"123.343 - 1.2.3.4.5").is_err());
    }

    #[test]
    fn test_create_analyzer_with_preferences() {
        let preferences = LexicalPreferences {
            collect_detailed_metrics: false,
            scan_chunk_size: 16,
            ..Default::default()
        };
        let analyzer = create_analyzer_with_preferences(preferences);
        assert!(!analyzer.preferences().collect_detailed_metrics);
        assert_eq!(analyzer.preferences().scan_chunk_size, 16);
    }
}
