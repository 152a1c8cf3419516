// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Whether to require the .5th extension (user preference, not a limit)
    pub require_fifth_extension: bool,

    /// Whether to enable detailed performance logging
    pub enable_performance_logging: bool,

    /// Whether to log debug information for files with foreign extensions
    pub log_foreign_extensions: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_fifth_extension: env::var("FIFTH_REQUIRE_FIFTH_EXTENSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_performance_logging: env::var("FIFTH_ENABLE_PERFORMANCE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_foreign_extensions: env::var("FIFTH_LOG_FOREIGN_EXTENSIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPreferences {
    /// Whether to collect detailed token metrics
    pub collect_detailed_metrics: bool,

    /// Whether to log string length statistics
    pub log_string_statistics: bool,

    /// Whether to show position information in error messages
    pub include_position_in_errors: bool,

    /// Chunk size for driving the resumable scanner over file contents.
    /// Zero scans the whole buffer in one call.
    pub scan_chunk_size: usize,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env::var("FIFTH_LEXICAL_DETAILED_METRICS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_string_statistics: env::var("FIFTH_LEXICAL_LOG_STRING_STATS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            include_position_in_errors: env::var("FIFTH_LEXICAL_INCLUDE_POSITIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            scan_chunk_size: env::var("FIFTH_LEXICAL_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include performance metrics in logs
    pub log_performance_events: bool,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("FIFTH_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("FIFTH_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("FIFTH_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env::var("FIFTH_LOGGING_LOG_PERFORMANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            enable_cargo_style_output: env::var("FIFTH_LOGGING_CARGO_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_file_context: env::var("FIFTH_LOGGING_INCLUDE_FILE_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel for compatibility
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_FIFTH_EXTENSION: &str = "FIFTH_REQUIRE_FIFTH_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "FIFTH_ENABLE_PERFORMANCE_LOGGING";
    pub const LOG_FOREIGN_EXTENSIONS: &str = "FIFTH_LOG_FOREIGN_EXTENSIONS";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "FIFTH_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_LOG_STRING_STATS: &str = "FIFTH_LEXICAL_LOG_STRING_STATS";
    pub const LEXICAL_INCLUDE_POSITIONS: &str = "FIFTH_LEXICAL_INCLUDE_POSITIONS";
    pub const LEXICAL_CHUNK_SIZE: &str = "FIFTH_LEXICAL_CHUNK_SIZE";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "FIFTH_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "FIFTH_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "FIFTH_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "FIFTH_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_CARGO_STYLE: &str = "FIFTH_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "FIFTH_LOGGING_INCLUDE_FILE_CONTEXT";
}
