//! Processing pipeline: file reading followed by lexical analysis

mod error;
pub mod output;

pub use error::PipelineError;

use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::logging;
use crate::tokens::ScanResult;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Complete pipeline result for one file
#[derive(Debug)]
pub struct PipelineResult {
    pub scan: ScanResult,
    pub file_metadata: FileMetadata,
    pub lexical_metrics: LexicalMetrics,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn token_count(&self) -> usize {
        self.scan.len()
    }

    pub fn log_success(&self, file_path: &str) {
        crate::log_success!(
            crate::logging::codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
            "File tokenized successfully",
            "file" => file_path,
            "tokens" => self.token_count(),
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0)
        );
    }
}

/// Process a single file through the pipeline (file -> lexical)
pub fn process_file(file_path: &str) -> Result<PipelineResult, PipelineError> {
    process_file_with_preferences(file_path, LexicalPreferences::default())
}

/// Process a single file with custom lexical preferences
pub fn process_file_with_preferences(
    file_path: &str,
    preferences: LexicalPreferences,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(PathBuf::from(file_path), 0, || {
        crate::log_info!("Starting Fifth tokenization pipeline", "file" => file_path);

        // Stage 1: File processing
        let file_result = crate::file_processor::process_file(file_path)?;

        // Stage 2: Lexical analysis
        let mut analyzer = crate::lexical::create_analyzer_with_preferences(preferences);
        let scan = analyzer.tokenize_file_result(&file_result)?;
        let lexical_metrics = analyzer.metrics().clone();

        let result = PipelineResult {
            scan,
            file_metadata: file_result.metadata,
            lexical_metrics,
            processing_duration: start_time.elapsed(),
        };

        result.log_success(file_path);

        Ok(result)
    })
}

/// Validate the pipeline configuration at startup
pub fn validate_pipeline() -> Result<(), String> {
    crate::logging::config::validate_config()?;
    crate::file_processor::init_file_processor_logging()?;
    crate::lexical::validate_tokenization()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_validate_pipeline() {
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_process_file_end_to_end() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("program.5th");
        fs::write(&file_path, "2 4 3 + * print_stack_top\n:stack_trace\n").unwrap();

        let result = process_file(file_path.to_str().unwrap()).unwrap();
        assert_eq!(result.token_count(), 7);
        assert_eq!(result.lexical_metrics.integer_tokens, 3);
        assert_eq!(result.lexical_metrics.identifier_tokens, 3);
        assert_eq!(result.lexical_metrics.debug_command_tokens, 1);
        assert_eq!(result.file_metadata.line_count, 2);
    }

    #[test]
    fn test_process_file_lexical_failure() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad.5th");
        fs::write(&file_path, "2a3 - 4\n").unwrap();

        let error = process_file(file_path.to_str().unwrap()).unwrap_err();
        assert_matches!(error, PipelineError::LexicalAnalysis(_));
        assert_eq!(error.error_code().as_str(), "E022");
    }

    #[test]
    fn test_process_missing_file() {
        let error = process_file("does-not-exist.5th").unwrap_err();
        assert_matches!(error, PipelineError::FileProcessing(_));
    }

    #[test]
    fn test_process_file_chunked_preferences() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("program.5th");
        fs::write(&file_path, "1 2 'three' :four\n").unwrap();

        let preferences = LexicalPreferences {
            scan_chunk_size: 3,
            ..Default::default()
        };
        let result =
            process_file_with_preferences(file_path.to_str().unwrap(), preferences).unwrap();
        assert_eq!(result.token_count(), 4);
    }
}
