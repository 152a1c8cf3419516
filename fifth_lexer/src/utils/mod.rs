//! Shared primitive types for the Fifth lexer
//!
//! Source position tracking used by the scanner, the token records, and the
//! diagnostic renderers.

pub mod span;

pub use span::{Position, SourceMap, Span};
