//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and
//! classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const INTEGER_OVERFLOW: Code = Code::new("E025");
    pub const TOO_MANY_TOKENS: Code = Code::new("E026");
    pub const SCANNER_STATE_INVALID: Code = Code::new("E027");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        registry.insert(
            "ERR001",
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal system error",
                "File a bug report with the failing input",
            ),
        );
        registry.insert(
            "ERR002",
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Check system configuration and dependencies",
            ),
        );

        // File processing errors
        registry.insert(
            "E005",
            ErrorMetadata::new(
                "E005",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File not found at specified path",
                "Check file path and ensure file exists",
            ),
        );
        registry.insert(
            "E006",
            ErrorMetadata::new(
                "E006",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "File does not have .5th extension",
                "Rename file with .5th extension or verify file type",
            ),
        );
        registry.insert(
            "E007",
            ErrorMetadata::new(
                "E007",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File exceeds maximum size limit",
                "Reduce file size or increase processing limits",
            ),
        );
        registry.insert(
            "E008",
            ErrorMetadata::new(
                "E008",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File is empty when content expected",
                "Provide a file with content or check file integrity",
            ),
        );
        registry.insert(
            "E009",
            ErrorMetadata::new(
                "E009",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Permission denied accessing file",
                "Check file permissions and user access rights",
            ),
        );
        registry.insert(
            "E011",
            ErrorMetadata::new(
                "E011",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "I/O error during file operation",
                "Check disk space, permissions, and file system integrity",
            ),
        );
        registry.insert(
            "E012",
            ErrorMetadata::new(
                "E012",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Invalid file path provided",
                "Provide a valid file path",
            ),
        );

        // Lexical analysis errors
        registry.insert(
            "E020",
            ErrorMetadata::new(
                "E020",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "Input unit not valid for the current token",
                "Remove or separate the offending character",
            ),
        );
        registry.insert(
            "E021",
            ErrorMetadata::new(
                "E021",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "String literal not properly terminated",
                "Add the matching closing quote to the string literal",
            ),
        );
        registry.insert(
            "E022",
            ErrorMetadata::new(
                "E022",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Numeric literal format is invalid",
                "Fix the number format (stray letters, extra decimal points)",
            ),
        );
        registry.insert(
            "E023",
            ErrorMetadata::new(
                "E023",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Identifier exceeds maximum allowed length",
                "Reduce identifier length to 255 characters or less",
            ),
        );
        registry.insert(
            "E024",
            ErrorMetadata::new(
                "E024",
                "Lexical",
                Severity::Medium,
                true,
                false,
                "String literal exceeds maximum size limit",
                "Reduce string size or break into smaller parts",
            ),
        );
        registry.insert(
            "E025",
            ErrorMetadata::new(
                "E025",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Integer literal exceeds the 64-bit signed range",
                "Use a smaller integer or a real literal",
            ),
        );
        registry.insert(
            "E026",
            ErrorMetadata::new(
                "E026",
                "Lexical",
                Severity::High,
                false,
                true,
                "Input contains too many tokens",
                "Reduce input complexity or increase token limits",
            ),
        );
        registry.insert(
            "E027",
            ErrorMetadata::new(
                "E027",
                "Lexical",
                Severity::Critical,
                false,
                true,
                "Scanner reached a state outside the transition table",
                "File a bug report; the transition table is inconsistent",
            ),
        );

        // Success codes surfaced through the same registry
        registry.insert(
            "I004",
            ErrorMetadata::new(
                "I004",
                "System",
                Severity::Low,
                true,
                false,
                "System initialization completed successfully",
                "Continue normal operation",
            ),
        );
        registry.insert(
            "I006",
            ErrorMetadata::new(
                "I006",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "File processing completed successfully",
                "Continue to lexical analysis",
            ),
        );
        registry.insert(
            "I020",
            ErrorMetadata::new(
                "I020",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Tokenization completed successfully",
                "Continue to the next processing stage",
            ),
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_codes_registered() {
        for code in [
            lexical::INVALID_CHARACTER,
            lexical::UNTERMINATED_STRING,
            lexical::INVALID_NUMBER,
            lexical::IDENTIFIER_TOO_LONG,
            lexical::STRING_TOO_LARGE,
            lexical::INTEGER_OVERFLOW,
            lexical::TOO_MANY_TOKENS,
            lexical::SCANNER_STATE_INVALID,
        ] {
            assert!(get_error_metadata(code.as_str()).is_some(), "{}", code);
            assert_eq!(get_category(code.as_str()), "Lexical");
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("ERR001"));
        assert!(!is_recoverable("ERR001"));

        assert_eq!(get_severity("E020"), Severity::Medium);
        assert!(is_recoverable("E020"));
        assert!(!requires_halt("E020"));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_category("E999"), "Unknown");
        assert_eq!(get_severity("E999"), Severity::Medium);
    }

    #[test]
    fn test_code_display() {
        assert_eq!(lexical::INVALID_CHARACTER.to_string(), "E020");
        assert_eq!(success::TOKENIZATION_COMPLETE.as_str(), "I020");
    }
}
