// Internal modules
pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use lexical::{LexerError, ScanError, ScanStatus, Scanner};
pub use pipeline::{PipelineError, PipelineResult};
pub use tokens::{ScanResult, Token, TokenKind, TokenValue};
