//! Rendering of token listings and scan diagnostics
//!
//! The lexer core reports positions and classes; this module turns them
//! into human-readable output for the driver: a token-per-line listing and
//! an error rendering with the source line, a caret, and an
//! expected-vs-found description derived from the transition table.

use crate::lexical::{ScanError, TransitionTable};
use crate::tokens::{ScanResult, TokenKind};
use crate::utils::SourceMap;
use std::fmt::Write;

/// Render the token sequence, one token per line.
pub fn render_tokens(result: &ScanResult) -> String {
    let mut output = String::new();

    for (index, token) in result.iter().enumerate() {
        let value = match token.kind {
            TokenKind::Integer => token
                .as_integer()
                .map(|v| v.to_string())
                .unwrap_or_default(),
            TokenKind::Real => token.as_real().map(|v| v.to_string()).unwrap_or_default(),
            TokenKind::Str | TokenKind::Identifier | TokenKind::DebugCommand => result
                .text_of_lossy(token)
                .map(|text| format!("{:?}", text))
                .unwrap_or_default(),
        };

        let _ = writeln!(
            output,
            "{:>4}  {:<14} {:<24} {}..{} ({})",
            index,
            token.kind,
            value,
            token.span.start.offset,
            token.span.end.offset,
            token.span.start,
        );
    }

    let _ = writeln!(
        output,
        "\n{} tokens, {} characters, {} lines",
        result.len(),
        result.characters_processed,
        result.lines_processed
    );

    output
}

/// Render a scan failure with source context and an expected-vs-found
/// description of the rejecting input.
pub fn render_scan_error(error: &ScanError, source: &[u8], file_path: &str) -> String {
    let map = SourceMap::new(source);
    let position = error.position();
    let span = crate::utils::Span::single(position);

    let mut output = map.format_error(&span, &error.to_string());

    let _ = writeln!(
        output,
        "  --> {}:{}:{}",
        file_path, position.line, position.column
    );

    let expected = TransitionTable::shared().expected_inputs(error.state());
    if !expected.is_empty() {
        let expected_list = expected
            .iter()
            .map(|input| input.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            output,
            "  expected one of: {}; found: {}",
            expected_list,
            error.input_class()
        );
    }

    if error.raw() != 0 {
        let _ = writeln!(
            output,
            "  offending input: {:?} (0x{:02X})",
            char::from(error.raw()),
            error.raw()
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize_bytes;

    #[test]
    fn test_render_tokens_listing() {
        let result = tokenize_bytes(b"1 2.5 'hi' word :dbg").unwrap();
        let listing = render_tokens(&result);

        assert!(listing.contains("integer"));
        assert!(listing.contains("real"));
        assert!(listing.contains("string"));
        assert!(listing.contains("identifier"));
        assert!(listing.contains("debug-command"));
        assert!(listing.contains("5 tokens"));
    }

    #[test]
    fn test_render_scan_error_has_caret_and_expectation() {
        let source = b"12a3";
        let error = tokenize_bytes(source).unwrap_err();
        let rendered = render_scan_error(&error, source, "bad.5th");

        assert!(rendered.contains("12a3"));
        assert!(rendered.contains("^"));
        assert!(rendered.contains("bad.5th:1:3"));
        assert!(rendered.contains("expected one of:"));
        assert!(rendered.contains("digit"));
        assert!(rendered.contains("found: letter"));
        assert!(rendered.contains("'a'"));
    }

    #[test]
    fn test_render_unterminated_string_error() {
        let source = b"'open";
        let error = tokenize_bytes(source).unwrap_err();
        let rendered = render_scan_error(&error, source, "s.5th");

        assert!(rendered.contains("unterminated string literal"));
        assert!(rendered.contains("found: end-of-input"));
    }
}
