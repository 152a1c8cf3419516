//! Event system for Fifth lexer logging

use super::codes::Code;
use crate::utils::Span;
use std::collections::HashMap;
use std::time::SystemTime;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
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
}

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level,
            code,
            message: message.to_string(),
            span: None,
            context: HashMap::new(),
        }
    }

    /// Create a new error event
    pub fn error(error_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, error_code, message)
    }

    /// Create a new warning event (warnings may not have codes)
    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, Code::new("W000"), message)
    }

    /// Create a new info event (info may not need codes)
    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, Code::new("I000"), message)
    }

    /// Create a success event (info with success code)
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, success_code, message)
    }

    /// Create a debug event
    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, Code::new("D000"), message)
    }

    /// Add span information
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Add context data
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    /// Check if this is an error event
    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    /// Check if this is a warning event
    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    /// Check if this is an info event
    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    /// Check if this is a debug event
    pub fn is_debug(&self) -> bool {
        self.level == LogLevel::Debug
    }

    /// Check if this event requires halting
    pub fn requires_halt(&self) -> bool {
        super::codes::requires_halt(self.code.as_str())
    }

    /// Get severity from error code
    pub fn severity(&self) -> &'static str {
        super::codes::get_severity(self.code.as_str()).as_str()
    }

    /// Get error category
    pub fn category(&self) -> &'static str {
        super::codes::get_category(self.code.as_str())
    }

    /// Get error description
    pub fn description(&self) -> &'static str {
        super::codes::get_description(self.code.as_str())
    }

    /// Get recommended action
    pub fn recommended_action(&self) -> &'static str {
        super::codes::get_action(self.code.as_str())
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        super::codes::is_recoverable(self.code.as_str())
    }

    /// Format for display
    pub fn format(&self) -> String {
        let span_str = self
            .span
            .as_ref()
            .map(|s| format!(" at {}:{}", s.start().line, s.start().column))
            .unwrap_or_default();

        format!(
            "[{}] {} - {}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            span_str
        )
    }

    /// Format with detailed error information
    pub fn format_detailed(&self) -> String {
        let mut output = self.format();

        output.push_str(&format!("\n  Category: {}", self.category()));
        output.push_str(&format!("\n  Severity: {}", self.severity()));

        if self.is_error() {
            output.push_str(&format!("\n  Recoverable: {}", self.is_recoverable()));
            output.push_str(&format!("\n  Requires halt: {}", self.requires_halt()));
        }

        let description = self.description();
        if description != "Unknown error" {
            output.push_str(&format!("\n  Description: {}", description));
        }

        let action = self.recommended_action();
        if action != "No specific action available" {
            output.push_str(&format!("\n  Recommended action: {}", action));
        }

        if !self.context.is_empty() {
            output.push_str("\n  Context:");
            for (key, value) in &self.context {
                output.push_str(&format!("\n    {}: {}", key, value));
            }
        }

        output
    }

    /// Format as JSON for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let timestamp = self
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut json = serde_json::json!({
            "timestamp": timestamp,
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        if self.is_error() {
            json["error_metadata"] = serde_json::json!({
                "recoverable": self.is_recoverable(),
                "requires_halt": self.requires_halt(),
                "description": self.description(),
                "recommended_action": self.recommended_action(),
            });
        }

        if let Some(span) = &self.span {
            json["span"] = serde_json::json!({
                "start_offset": span.start().offset,
                "start_line": span.start().line,
                "start_column": span.start().column,
                "end_offset": span.end().offset,
            });
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::Value::Object(
                self.context
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            );
        }

        serde_json::to_string(&json)
    }
}
