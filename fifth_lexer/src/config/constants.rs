//! Reference copy of the development-profile compile-time limits.
//!
//! The authoritative values are generated by build.rs from
//! config/<profile>.toml; this copy exists so the limits are readable
//! without chasing the build output, and a config test asserts the two
//! stay in sync for the development profile.

pub mod compile_time {
    pub mod file_processing {
        /// Maximum file size allowed for processing (10MB)
        /// Prevents resource exhaustion via oversized inputs
        pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

        /// Threshold for considering a file "large" (1MB)
        /// Affects buffer pre-allocation strategy
        pub const LARGE_FILE_THRESHOLD: u64 = 1024 * 1024;

        /// Maximum line count accepted for a single file
        pub const MAX_LINE_COUNT: usize = 100_000;

        /// Performance logging buffer size
        pub const PERFORMANCE_LOG_BUFFER_SIZE: usize = 1000;
    }

    pub mod lexical {
        /// Maximum string literal size (1MB)
        /// Prevents resource exhaustion via enormous string literals
        pub const MAX_STRING_SIZE: usize = 1_048_576;

        /// Maximum identifier length (255 characters)
        pub const MAX_IDENTIFIER_LENGTH: usize = 255;

        /// Maximum number of tokens allowed in a single scan
        /// Prevents token explosion on pathological inputs
        pub const MAX_TOKEN_COUNT: usize = 1_000_000;
    }

    pub mod logging {
        /// Maximum errors to collect before stopping
        pub const MAX_ERROR_COLLECTION: usize = 1_000;

        /// Log buffer size for the in-memory collector
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Maximum log message length
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 10_000;

        /// Maximum log events retained per file before truncation
        pub const MAX_LOG_EVENTS_PER_FILE: usize = 1_000;
    }
}
