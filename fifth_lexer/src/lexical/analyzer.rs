//! File-aware lexical analyzer with logging and limit enforcement
//!
//! Wraps the resumable scanner with file context, runtime preferences,
//! metric collection, and the compile-time resource limits. The scanner
//! itself stays a pure automaton; everything operational lives here.

use crate::config::compile_time::lexical::{
    MAX_IDENTIFIER_LENGTH, MAX_STRING_SIZE, MAX_TOKEN_COUNT,
};
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::lexical::scanner::{ScanError, ScanStatus, Scanner};
use crate::logging::codes;
use crate::tokens::{ScanResult, Token, TokenKind};
use crate::utils::Span;
use crate::{log_debug, log_error, log_success};

/// Lexical analysis errors: scan failures plus resource-limit violations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize },

    #[error("string too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize },

    #[error("too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> codes::Code {
        match self {
            LexerError::Scan(error) => error.error_code(),
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }
}

/// Essential lexical analysis metrics
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub integer_tokens: usize,
    pub real_tokens: usize,
    pub string_tokens: usize,
    pub identifier_tokens: usize,
    pub debug_command_tokens: usize,
    pub max_string_length: usize,
    pub max_identifier_length: usize,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;

        match token.kind {
            TokenKind::Integer => self.integer_tokens += 1,
            TokenKind::Real => self.real_tokens += 1,
            TokenKind::Str => {
                self.string_tokens += 1;
                if let Some(slice) = token.as_text() {
                    self.record_string_length(slice.len, preferences);
                }
            }
            TokenKind::Identifier => {
                self.identifier_tokens += 1;
                if let Some(slice) = token.as_text() {
                    self.max_identifier_length = self.max_identifier_length.max(slice.len);
                }
            }
            TokenKind::DebugCommand => self.debug_command_tokens += 1,
        }
    }

    pub(crate) fn record_string_length(&mut self, length: usize, preferences: &LexicalPreferences) {
        self.max_string_length = self.max_string_length.max(length);

        if preferences.log_string_statistics {
            log_debug!("String literal processed",
                "length" => length,
                "max_so_far" => self.max_string_length
            );
        }
    }
}

/// Lexical analyzer driving the scanner over whole files
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences: LexicalPreferences::default(),
        }
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Tokenize a processed file
    pub fn tokenize_file_result(
        &mut self,
        file_result: &FileProcessingResult,
    ) -> Result<ScanResult, LexerError> {
        // Reset metrics for this tokenization
        self.metrics = LexicalMetrics::default();

        let source = &file_result.source;
        let file_path = file_result.metadata.path.display().to_string();

        log_debug!("Starting lexical analysis",
            "file" => file_path.as_str(),
            "byte_count" => source.len(),
            "line_count" => file_result.metadata.line_count,
            "chunk_size" => self.preferences.scan_chunk_size,
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        let result = match self.drive_scanner(source) {
            Ok(result) => result,
            Err(error) => {
                let position = error.position();
                let span = Span::single(position);
                let message = if self.preferences.include_position_in_errors {
                    format!(
                        "Lexical analysis failed at line {}, column {}",
                        position.line, position.column
                    )
                } else {
                    "Lexical analysis failed".to_string()
                };

                log_error!(error.error_code(), &message,
                    span = span,
                    "file" => file_path.as_str(),
                    "state" => error.state(),
                    "input_class" => error.input_class(),
                    "raw" => error.raw()
                );
                return Err(LexerError::Scan(error));
            }
        };

        self.enforce_limits(&result, &file_path)?;

        if self.preferences.collect_detailed_metrics {
            for token in result.iter() {
                self.metrics.record_token(token, &self.preferences);
            }
        } else {
            self.metrics.total_tokens = result.len();
        }

        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Lexical analysis completed successfully",
            "file" => file_path.as_str(),
            "token_count" => result.len(),
            "integers" => self.metrics.integer_tokens,
            "reals" => self.metrics.real_tokens,
            "strings" => self.metrics.string_tokens,
            "identifiers" => self.metrics.identifier_tokens,
            "debug_commands" => self.metrics.debug_command_tokens,
            "chars_processed" => result.characters_processed,
            "lines_processed" => result.lines_processed
        );

        Ok(result)
    }

    /// Feed the source to the scanner, honoring the chunk-size preference
    fn drive_scanner(&self, source: &[u8]) -> Result<ScanResult, ScanError> {
        let mut scanner = Scanner::new();
        let mut result = ScanResult::with_capacity(source.len());

        let chunk_size = self.preferences.scan_chunk_size;
        if chunk_size == 0 {
            return match scanner.scan(source, true, &mut result) {
                ScanStatus::Completed => Ok(result),
                ScanStatus::Failed(error) => Err(error),
                ScanStatus::NeedMoreInput | ScanStatus::InvalidState => {
                    Err(ScanError::InvalidState {
                        state: scanner.state(),
                    })
                }
            };
        }

        let mut offset = 0;
        loop {
            let end = (offset + chunk_size).min(source.len());
            let last = end == source.len();
            match scanner.scan(&source[offset..end], last, &mut result) {
                ScanStatus::Completed => return Ok(result),
                ScanStatus::Failed(error) => return Err(error),
                ScanStatus::NeedMoreInput if !last => offset = end,
                ScanStatus::NeedMoreInput | ScanStatus::InvalidState => {
                    return Err(ScanError::InvalidState {
                        state: scanner.state(),
                    })
                }
            }
        }
    }

    /// Apply the compile-time resource limits to a completed scan
    fn enforce_limits(&self, result: &ScanResult, file_path: &str) -> Result<(), LexerError> {
        if result.len() > MAX_TOKEN_COUNT {
            let error = LexerError::TooManyTokens { count: result.len() };
            log_error!(error.error_code(), "Token limit exceeded",
                "file" => file_path,
                "token_count" => result.len(),
                "limit" => MAX_TOKEN_COUNT
            );
            return Err(error);
        }

        for token in result.iter() {
            match (token.kind, token.as_text()) {
                (TokenKind::Str, Some(slice)) if slice.len > MAX_STRING_SIZE => {
                    let error = LexerError::StringTooLarge { size: slice.len };
                    log_error!(error.error_code(), "String literal exceeds size limit",
                        span = token.span,
                        "file" => file_path,
                        "size" => slice.len,
                        "limit" => MAX_STRING_SIZE
                    );
                    return Err(error);
                }
                (TokenKind::Identifier, Some(slice)) if slice.len > MAX_IDENTIFIER_LENGTH => {
                    let error = LexerError::IdentifierTooLong { length: slice.len };
                    log_error!(error.error_code(), "Identifier exceeds length limit",
                        span = token.span,
                        "file" => file_path,
                        "length" => slice.len,
                        "limit" => MAX_IDENTIFIER_LENGTH
                    );
                    return Err(error);
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Get current metrics
    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Get current preferences
    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    /// Update preferences (runtime configurable)
    pub fn set_preferences(&mut self, preferences: LexicalPreferences) {
        self.preferences = preferences;
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_processor::{FileMetadata, FileProcessingResult};
    use assert_matches::assert_matches;
    use std::path::PathBuf;

    fn file_result(source: &[u8]) -> FileProcessingResult {
        FileProcessingResult {
            source: source.to_vec(),
            metadata: FileMetadata {
                path: PathBuf::from("test.5th"),
                size: source.len() as u64,
                extension: Some("5th".to_string()),
                line_count: source.iter().filter(|b| **b == b'\n').count(),
                is_fifth_file: true,
                modified: None,
            },
            processing_duration: std::time::Duration::from_millis(1),
        }
    }

    #[test]
    fn test_tokenize_file_result_metrics() {
        let mut analyzer = LexicalAnalyzer::new();
        let result = analyzer
            .tokenize_file_result(&file_result(b"1 2.5 'str' word :dbg"))
            .unwrap();

        assert_eq!(result.len(), 5);
        let metrics = analyzer.metrics();
        assert_eq!(metrics.total_tokens, 5);
        assert_eq!(metrics.integer_tokens, 1);
        assert_eq!(metrics.real_tokens, 1);
        assert_eq!(metrics.string_tokens, 1);
        assert_eq!(metrics.identifier_tokens, 1);
        assert_eq!(metrics.debug_command_tokens, 1);
        assert_eq!(metrics.max_string_length, 3);
        assert_eq!(metrics.max_identifier_length, 4);
    }

    #[test]
    fn test_scan_error_propagates() {
        let mut analyzer = LexicalAnalyzer::new();
        let error = analyzer
            .tokenize_file_result(&file_result(b"12a3"))
            .unwrap_err();
        assert_matches!(error, LexerError::Scan(ScanError::Rejected { .. }));
        assert_eq!(error.error_code().as_str(), "E022");
    }

    #[test]
    fn test_identifier_length_limit() {
        let mut analyzer = LexicalAnalyzer::new();
        let long_name = vec![b'x'; MAX_IDENTIFIER_LENGTH + 1];
        let error = analyzer
            .tokenize_file_result(&file_result(&long_name))
            .unwrap_err();
        assert_matches!(error, LexerError::IdentifierTooLong { .. });
        assert_eq!(error.error_code().as_str(), "E023");
    }

    #[test]
    fn test_identifier_at_length_limit_passes() {
        let mut analyzer = LexicalAnalyzer::new();
        let name = vec![b'x'; MAX_IDENTIFIER_LENGTH];
        let result = analyzer.tokenize_file_result(&file_result(&name)).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_chunked_scan_matches_whole_scan() {
        let source = b"-12 3.5 'a b' ident :dbg + .25";

        let mut whole = LexicalAnalyzer::new();
        let whole_result = whole.tokenize_file_result(&file_result(source)).unwrap();

        for chunk_size in [1, 2, 3, 7, source.len()] {
            let mut chunked = LexicalAnalyzer::with_preferences(LexicalPreferences {
                scan_chunk_size: chunk_size,
                ..Default::default()
            });
            let chunked_result = chunked.tokenize_file_result(&file_result(source)).unwrap();

            assert_eq!(whole_result.len(), chunked_result.len(), "chunk {}", chunk_size);
            for (a, b) in whole_result.iter().zip(chunked_result.iter()) {
                assert_eq!(a.kind, b.kind);
                assert_eq!(a.span, b.span);
            }
        }
    }

    #[test]
    fn test_empty_source() {
        let mut analyzer = LexicalAnalyzer::new();
        let result = analyzer.tokenize_file_result(&file_result(b"")).unwrap();
        assert!(result.is_empty());
        assert_eq!(analyzer.metrics().total_tokens, 0);
    }
}
