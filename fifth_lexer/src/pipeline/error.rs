//! Pipeline error type covering both processing stages

use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;

/// Errors from the file-to-tokens pipeline
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        PipelineError::Pipeline {
            message: message.to_string(),
        }
    }

    /// Error code of the underlying failure
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            PipelineError::FileProcessing(error) => error.error_code(),
            PipelineError::LexicalAnalysis(error) => error.error_code(),
            PipelineError::Pipeline { .. } => crate::logging::codes::system::INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let file_error = FileProcessorError::EmptyFile;
        let pipeline_error: PipelineError = file_error.into();
        assert_eq!(pipeline_error.error_code().as_str(), "E008");
    }

    #[test]
    fn test_pipeline_error_display() {
        let error = PipelineError::pipeline_error("stage mismatch");
        assert!(error.to_string().contains("stage mismatch"));
        assert_eq!(error.error_code().as_str(), "ERR001");
    }
}
