//! Error collector with cargo-style output
//!
//! Collects events grouped by file so the driver can print one organized
//! report at exit instead of interleaved log lines.

use super::events::LogEvent;
use crate::config::compile_time::logging::{LOG_BUFFER_SIZE, MAX_LOG_EVENTS_PER_FILE};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Context information for file processing
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Summary of collected events
#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

/// Thread-safe error collector
pub struct ErrorCollector {
    /// Events organized by file path for cargo-style output
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,

    /// Processing contexts for timing information
    file_contexts: Mutex<BTreeMap<PathBuf, FileProcessingContext>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            file_contexts: Mutex::new(BTreeMap::new()),
        }
    }

    /// Record an event for a specific file
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = self.file_events.lock().unwrap();

        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    /// Record file processing context
    pub fn record_file_context(&self, context: FileProcessingContext) {
        let mut contexts = self.file_contexts.lock().unwrap();
        contexts.insert(context.file_path.clone(), context);
    }

    /// Get errors for a specific file
    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        let events = self.file_events.lock().unwrap();
        events
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    /// Get all file events (for cargo-style output)
    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.file_events.lock().unwrap().clone()
    }

    /// Get a summary of everything collected so far
    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.file_events.lock().unwrap();

        let mut summary = ProcessingSummary {
            total_files: events.len(),
            ..Default::default()
        };

        for file_events in events.values() {
            let has_errors = file_events.iter().any(|e| e.is_error());
            let has_warnings = file_events.iter().any(|e| e.is_warning());

            if has_errors {
                summary.failed_files += 1;
            } else if has_warnings {
                summary.files_with_warnings += 1;
            }

            for event in file_events {
                if event.is_error() {
                    summary.total_errors += 1;
                } else if event.is_warning() {
                    summary.total_warnings += 1;
                }
            }
        }

        summary
    }

    /// Check if a file has any errors
    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        !self.get_file_errors(file_path).is_empty()
    }

    /// Get total event count across all files
    pub fn total_event_count(&self) -> usize {
        let events = self.file_events.lock().unwrap();
        events.values().map(|v| v.len()).sum()
    }

    /// Capacity information against the compile-time buffer limit
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let current = self.total_event_count();
        let max = LOG_BUFFER_SIZE;
        let percentage = if max > 0 {
            current as f64 / max as f64
        } else {
            0.0
        };
        (current, max, percentage)
    }

    /// Clear all collected data
    pub fn clear(&self) {
        self.file_events.lock().unwrap().clear();
        self.file_contexts.lock().unwrap().clear();
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

/// Format collected errors in cargo-style output
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();
    let all_events = collector.get_all_file_events();

    for (file_path, events) in &all_events {
        let error_events: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warning_events: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if error_events.is_empty() && warning_events.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));

        for event in error_events {
            let span_info = event
                .span
                .as_ref()
                .map(|s| {
                    format!(
                        " --> {}:{}:{}",
                        file_path.display(),
                        s.start().line,
                        s.start().column
                    )
                })
                .unwrap_or_default();

            output.push_str(&format!(
                "error[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                span_info
            ));

            output.push_str(&format!(
                "  = severity: {}, category: {}\n",
                event.severity(),
                event.category()
            ));

            for (key, value) in &event.context {
                if key != "file" && key != "file_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }

            let action = event.recommended_action();
            if action != "No specific action available" {
                output.push_str(&format!("  = help: {}\n", action));
            }
        }

        for event in warning_events {
            output.push_str(&format!(
                "warning[{}]: {}\n",
                event.code.as_str(),
                event.message
            ));
        }

        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("\nTotal errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}
