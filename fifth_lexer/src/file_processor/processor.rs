//! File processor implementation
//!
//! Reads Fifth source files as raw bytes: the lexer classifies input
//! byte-wise, so no encoding validation happens here. Size and line-count
//! limits come from the compile-time constants.

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};

/// File processor specific errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .5th, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    /// Get the appropriate error code for this error type
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => {
                codes::file_processing::INVALID_EXTENSION
            }
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::EmptyFile => codes::file_processing::EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
            FileProcessorError::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
            FileProcessorError::TooManyLines { .. } => codes::file_processing::FILE_TOO_LARGE,
        }
    }

    /// Check if this error should halt processing
    pub fn requires_halt(&self) -> bool {
        crate::logging::codes::requires_halt(self.error_code().as_str())
    }

    /// Get error severity
    pub fn severity(&self) -> &'static str {
        crate::logging::codes::get_severity(self.error_code().as_str()).as_str()
    }
}

/// File metadata collected during processing
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// File extension (if any)
    pub extension: Option<String>,
    /// Number of newline-terminated lines in the file
    pub line_count: usize,
    /// Whether file has the .5th extension
    pub is_fifth_file: bool,
    /// File modification time (if available)
    pub modified: Option<std::time::SystemTime>,
}

impl FileMetadata {
    /// Get file size in human-readable format
    pub fn human_readable_size(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", self.size, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Check if file is likely to be large for processing
    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

/// File processing result containing source bytes and metadata
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    /// Raw file contents
    pub source: Vec<u8>,
    /// File metadata
    pub metadata: FileMetadata,
    /// Processing duration
    pub processing_duration: std::time::Duration,
}

impl FileProcessingResult {
    /// Get byte count
    pub fn byte_count(&self) -> usize {
        self.source.len()
    }

    /// Check if file is empty content-wise (only whitespace)
    pub fn is_effectively_empty(&self) -> bool {
        self.source
            .iter()
            .all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
    }
}

/// File processor with compile-time limits and runtime preferences
pub struct FileProcessor {
    /// Whether to require the .5th extension (runtime preference)
    pub require_fifth_extension: bool,
    /// Whether to enable detailed performance logging (runtime preference)
    pub enable_performance_logging: bool,
    /// Whether to log debug information for foreign extensions
    pub log_foreign_extensions: bool,
}

impl FileProcessor {
    /// Create new file processor with default preferences
    pub fn new() -> Self {
        Self {
            require_fifth_extension: false,
            enable_performance_logging: true,
            log_foreign_extensions: true,
        }
    }

    /// Create file processor from runtime preferences
    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_fifth_extension: prefs.require_fifth_extension,
            enable_performance_logging: prefs.enable_performance_logging,
            log_foreign_extensions: prefs.log_foreign_extensions,
        }
    }

    /// Require the .5th extension
    pub fn with_fifth_extension_required(mut self, required: bool) -> Self {
        self.require_fifth_extension = required;
        self
    }

    /// Enable or disable performance logging
    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    /// Get the compile-time maximum file size
    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    /// Process a file and return contents with metadata
    pub fn process_file(
        &self,
        file_path: &str,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = std::time::Instant::now();

        log_debug!("Starting file processing", "file" => file_path);

        let path = self.validate_path(file_path)?;
        let metadata = self.get_metadata(&path)?;
        self.validate_file(&metadata, file_path)?;
        let source = self.read_file(&path, file_path)?;

        let line_count = source.iter().filter(|b| **b == b'\n').count();
        if line_count > MAX_LINE_COUNT {
            let error = FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT,
            };
            log_error!(error.error_code(), "File exceeds maximum line count",
                "file" => file_path,
                "lines" => line_count,
                "max_lines" => MAX_LINE_COUNT);
            return Err(error);
        }

        let mut final_metadata = metadata;
        final_metadata.line_count = line_count;

        let result = FileProcessingResult {
            source,
            metadata: final_metadata,
            processing_duration: start_time.elapsed(),
        };

        self.log_processing_success(&result, file_path);

        if !result.metadata.is_fifth_file
            && !self.require_fifth_extension
            && self.log_foreign_extensions
        {
            let ext_str = result.metadata.extension.as_deref().unwrap_or("none");
            log_debug!(
                "Processing file with foreign extension",
                "extension" => ext_str,
                "file" => file_path
            );
        }

        Ok(result)
    }

    /// Log processing success with metrics
    fn log_processing_success(&self, result: &FileProcessingResult, file_path: &str) {
        if self.enable_performance_logging {
            let duration_ms = result.processing_duration.as_secs_f64() * 1000.0;
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully",
                "file" => file_path,
                "size_bytes" => result.metadata.size,
                "size_human" => result.metadata.human_readable_size(),
                "lines" => result.metadata.line_count,
                "duration_ms" => format!("{:.2}", duration_ms),
                "is_large_file" => result.metadata.is_large_file()
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully",
                "file" => file_path,
                "size_bytes" => result.metadata.size,
                "lines" => result.metadata.line_count
            );
        }
    }

    /// Validate file path and check existence
    fn validate_path(&self, file_path: &str) -> Result<PathBuf, FileProcessorError> {
        if file_path.is_empty() {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Empty file path provided");
            return Err(error);
        }

        let path = Path::new(file_path);

        if !path.exists() {
            let error = FileProcessorError::FileNotFound {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "File not found", "path" => file_path);
            return Err(error);
        }

        if !path.is_file() {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Path is not a file", "path" => file_path);
            return Err(error);
        }

        match path.canonicalize() {
            Ok(canonical_path) => Ok(canonical_path),
            Err(e) => {
                let error = FileProcessorError::IoError {
                    message: format!("Failed to resolve path '{}': {}", file_path, e),
                };
                log_error!(error.error_code(), "Failed to canonicalize path",
                    "path" => file_path,
                    "io_error" => e);
                Err(error)
            }
        }
    }

    /// Get file metadata
    fn get_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let metadata = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                let error = match e.kind() {
                    std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                        path: path.display().to_string(),
                    },
                    _ => FileProcessorError::IoError {
                        message: format!("Failed to read metadata for '{}': {}", path.display(), e),
                    },
                };
                log_error!(error.error_code(), "Failed to read file metadata",
                    "path" => path.display(),
                    "io_error" => e);
                return Err(error);
            }
        };

        let size = metadata.len();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());
        let is_fifth_file = extension.as_deref() == Some("5th");
        let modified = metadata.modified().ok();

        Ok(FileMetadata {
            path: path.to_path_buf(),
            size,
            extension,
            line_count: 0, // Updated after reading
            is_fifth_file,
            modified,
        })
    }

    /// Validate file properties using compile-time constants
    fn validate_file(
        &self,
        metadata: &FileMetadata,
        file_path: &str,
    ) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            };
            log_error!(error.error_code(), "File exceeds maximum size limit",
                "file" => file_path,
                "size_bytes" => metadata.size,
                "limit_bytes" => MAX_FILE_SIZE);
            return Err(error);
        }

        if metadata.size == 0 {
            let error = FileProcessorError::EmptyFile;
            log_error!(error.error_code(), "File is empty", "file" => file_path);
            return Err(error);
        }

        if self.require_fifth_extension && !metadata.is_fifth_file {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            let ext_str = metadata.extension.as_deref().unwrap_or("none");
            log_error!(error.error_code(), "File does not have required .5th extension",
                "file" => file_path,
                "extension" => ext_str);
            return Err(error);
        }

        Ok(())
    }

    /// Read file contents as raw bytes
    fn read_file(&self, path: &Path, file_path: &str) -> Result<Vec<u8>, FileProcessorError> {
        match fs::read(path) {
            Ok(content) => {
                log_debug!("File content read successfully",
                    "file" => file_path,
                    "bytes" => content.len());
                Ok(content)
            }
            Err(e) => {
                let error = match e.kind() {
                    std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                        path: path.display().to_string(),
                    },
                    _ => FileProcessorError::IoError {
                        message: format!("Failed to read file '{}': {}", path.display(), e),
                    },
                };
                log_error!(error.error_code(), "I/O error reading file",
                    "file" => file_path,
                    "io_error" => e);
                Err(error)
            }
        }
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}
