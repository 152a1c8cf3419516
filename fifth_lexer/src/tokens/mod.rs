//! Token system for Fifth lexical analysis
//!
//! Tokens are the unitary elements of a Fifth program: integers, reals,
//! quote-delimited strings, identifiers, and colon-prefixed debug commands.
//! A token carries its decoded value and the span of source text it was
//! read from.
//!
//! Textual token content (strings, identifiers, debug commands) is not
//! stored inline: each scan owns one growable byte buffer in its
//! [`ScanResult`], and tokens reference their text by `(start, len)` index
//! pairs. Indices stay valid when the buffer reallocates, and a scan makes
//! one allocation arena instead of one allocation per token.

pub mod scan_result;
pub mod token;

pub use scan_result::ScanResult;
pub use token::{TextSlice, Token, TokenKind, TokenValue};

// Re-export span types from utils
pub use crate::utils::{Position, Span};
