//! Logging service implementation

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use crate::utils::Span;
use std::sync::{Arc, Mutex};

/// Simple logger trait
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main logging service with configuration awareness
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    /// Create new logging service with specified logger and minimum level
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Create service with configuration-aware settings
    pub fn with_config() -> Self {
        let min_level = config::get_min_log_level();
        let logger: Arc<dyn Logger> = if config::use_structured_logging() {
            Arc::new(StructuredLogger::new(min_level))
        } else {
            Arc::new(ConsoleLogger::new(min_level))
        };

        Self::new(logger, min_level)
    }

    /// Check if level should be logged
    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    /// Log an event
    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    /// Convenience method: log error with code
    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    /// Convenience method: log error with span
    pub fn log_error_with_span(&self, error_code: Code, message: &str, span: Span) {
        self.log_event(LogEvent::error(error_code, message).with_span(span));
    }

    /// Convenience method: log info
    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    /// Convenience method: log success
    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }

    /// Convenience method: log warning
    pub fn log_warning(&self, message: &str) {
        self.log_event(LogEvent::warning(message));
    }

    /// Convenience method: log debug
    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// Simple console logger
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            match event.level {
                LogLevel::Error => eprintln!("{}", event.format()),
                _ => println!("{}", event.format()),
            }
        }
    }
}

/// Structured logger for JSON output and better tooling integration
pub struct StructuredLogger {
    min_level: LogLevel,
}

impl StructuredLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            match event.format_json() {
                Ok(json) => match event.level {
                    LogLevel::Error => eprintln!("{}", json),
                    _ => println!("{}", json),
                },
                Err(_) => {
                    // Fallback to regular format if JSON serialization fails
                    match event.level {
                        LogLevel::Error => eprintln!("{}", event.format()),
                        _ => println!("{}", event.format()),
                    }
                }
            }
        }
    }
}

/// Memory logger for testing
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.is_error())
            .cloned()
            .collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.is_error() && e.code.as_str() == code.as_str())
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.is_info() && e.code.as_str() == code.as_str())
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.events.lock().unwrap();

        // Respect buffer size limits from config
        let max_events = config::get_error_buffer_size();
        if events.len() >= max_events {
            let remove_count = events.len() - max_events + 1;
            events.drain(0..remove_count);
        }

        events.push(event.clone());
    }
}

// ============================================================================
// CONFIGURATION-AWARE FACTORY FUNCTIONS
// ============================================================================

/// Create logging service based on current configuration
pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}

/// Create testing logger (memory-based, all events captured)
pub fn create_test_logger() -> Arc<MemoryLogger> {
    Arc::new(MemoryLogger::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_console_logger() {
        let logger = ConsoleLogger::new(LogLevel::Info);
        let event = LogEvent::info("Test message");

        // Should not panic
        logger.log(&event);
    }

    #[test]
    fn test_structured_logger() {
        let logger = StructuredLogger::new(LogLevel::Debug);
        let event = LogEvent::error(codes::file_processing::FILE_NOT_FOUND, "Test error")
            .with_context("key", "value");

        // Should not panic and should produce JSON
        logger.log(&event);
    }

    #[test]
    fn test_memory_logger() {
        let logger = MemoryLogger::new();

        logger.log(&LogEvent::info("Message 1"));
        logger.log(&LogEvent::error(
            codes::lexical::INVALID_CHARACTER,
            "Error message",
        ));

        assert_eq!(logger.event_count(), 2);
        assert_eq!(logger.get_errors().len(), 1);
        assert!(logger.has_error_with_code(codes::lexical::INVALID_CHARACTER));

        logger.clear();
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_logging_service() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Debug);

        service.log_error(codes::file_processing::PERMISSION_DENIED, "Test error");
        service.log_success(codes::success::FILE_PROCESSING_SUCCESS, "Test success");
        service.log_info("Test info");

        assert_eq!(logger.event_count(), 3);
        assert!(logger.has_error_with_code(codes::file_processing::PERMISSION_DENIED));
        assert!(logger.has_success_with_code(codes::success::FILE_PROCESSING_SUCCESS));
    }

    #[test]
    fn test_log_level_filtering() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Error);

        service.log_debug("Debug message");
        service.log_info("Info message");
        service.log_error(codes::system::INTERNAL_ERROR, "Error message");

        // Only error should be logged due to level filtering
        assert_eq!(logger.event_count(), 1);
        assert!(logger.has_error_with_code(codes::system::INTERNAL_ERROR));
    }
}
