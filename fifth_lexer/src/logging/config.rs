//! Configuration access for logging
//!
//! Buffer sizes come from the compile-time constants; output format and
//! verbosity come from runtime user preferences.

use crate::config::compile_time::logging::{
    LOG_BUFFER_SIZE, MAX_LOG_EVENTS_PER_FILE, MAX_LOG_MESSAGE_LENGTH,
};
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

// Type aliases for clarity
type EventsLogLevel = crate::logging::events::LogLevel;
type RuntimeLogLevel = crate::config::runtime::LogLevel;

// ============================================================================
// RUNTIME PREFERENCES STORAGE
// ============================================================================

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Initialize runtime preferences
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

/// Get runtime preferences (with fallback to defaults)
fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

// ============================================================================
// CONFIGURATION ACCESS FUNCTIONS
// ============================================================================

/// Get minimum log level (user preference)
pub fn get_min_log_level() -> EventsLogLevel {
    get_runtime_preferences().min_log_level.to_events_log_level()
}

/// Check if structured logging is enabled (user preference)
pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

/// Check if console logging is enabled (user preference)
pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

/// Check if performance events should be logged (user preference)
pub fn log_performance_events() -> bool {
    get_runtime_preferences().log_performance_events
}

/// Check if cargo-style output is enabled (user preference)
pub fn use_cargo_style_output() -> bool {
    get_runtime_preferences().enable_cargo_style_output
}

/// Check if file context should be included (user preference)
pub fn include_file_context() -> bool {
    get_runtime_preferences().include_file_context
}

/// Get error buffer size (compile-time constant)
pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

/// Get maximum log events per file (compile-time constant)
pub fn get_max_log_events_per_file() -> usize {
    MAX_LOG_EVENTS_PER_FILE
}

/// Get maximum log message length (compile-time constant)
pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

// ============================================================================
// CONFIGURATION VALIDATION
// ============================================================================

/// Validate current configuration settings
pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE > 100_000 {
        return Err(format!("Log buffer size too large: {}", LOG_BUFFER_SIZE));
    }

    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }

    if MAX_LOG_EVENTS_PER_FILE > LOG_BUFFER_SIZE {
        return Err("Max log events per file exceeds total buffer size".to_string());
    }

    Ok(())
}

/// Get configuration summary for diagnostics
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         === Compile-time Constants ===\n\
         - Log buffer size: {}\n\
         - Max events per file: {}\n\
         - Max message length: {}\n\
         === User Preferences (Runtime) ===\n\
         - Min log level: {:?}\n\
         - Structured logging: {}\n\
         - Console logging: {}\n\
         - Performance events: {}\n\
         - Cargo-style output: {}\n\
         - Include file context: {}",
        LOG_BUFFER_SIZE,
        MAX_LOG_EVENTS_PER_FILE,
        MAX_LOG_MESSAGE_LENGTH,
        preferences.min_log_level,
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.log_performance_events,
        preferences.enable_cargo_style_output,
        preferences.include_file_context,
    )
}

/// Get recommended configuration for development
pub fn get_development_preferences() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: false,
        enable_console_logging: true,
        min_log_level: RuntimeLogLevel::Debug,
        log_performance_events: true,
        enable_cargo_style_output: true,
        include_file_context: true,
    }
}

/// Get recommended configuration for production
pub fn get_production_preferences() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: true,
        enable_console_logging: false,
        min_log_level: RuntimeLogLevel::Info,
        log_performance_events: false,
        enable_cargo_style_output: false,
        include_file_context: false,
    }
}
