//! File processor module with compile-time limits and logging integration

mod processor;

use crate::config::runtime::FileProcessorPreferences;

pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

/// Process a file with default settings
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

/// Create a file processor with default settings
pub fn create_processor() -> FileProcessor {
    FileProcessor::new()
}

/// Create a file processor from runtime preferences
pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}

/// Validate that every file-processing error code is registered
pub fn init_file_processor_logging() -> Result<(), String> {
    let test_codes = [
        crate::logging::codes::file_processing::FILE_NOT_FOUND,
        crate::logging::codes::file_processing::INVALID_EXTENSION,
        crate::logging::codes::file_processing::FILE_TOO_LARGE,
        crate::logging::codes::file_processing::EMPTY_FILE,
        crate::logging::codes::file_processing::PERMISSION_DENIED,
        crate::logging::codes::file_processing::IO_ERROR,
        crate::logging::codes::file_processing::INVALID_PATH,
    ];

    for code in &test_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "File processor error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}
