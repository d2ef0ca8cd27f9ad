//! # Error Types
//!
//! Custom error types for Fake Joy using `thiserror`.

use thiserror::Error;

/// Main error type for Fake Joy
#[derive(Debug, Error)]
pub enum FakeJoyError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors (terminal, socket, files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bus frame encoding errors
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// A display line index outside the configured logical line count.
    ///
    /// Indicates a mismatch between render calls and the window geometry,
    /// never a runtime condition.
    #[error("Line index {index} out of range (window has {lines} lines)")]
    LineOutOfRange {
        /// Requested logical line
        index: usize,
        /// Configured logical line count
        lines: usize,
    },

    /// Log subscriber could not be installed
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// Invalid button model or key binding table
    #[error("Invalid button model: {0}")]
    InvalidModel(String),
}

/// Result type alias for Fake Joy
pub type Result<T> = std::result::Result<T, FakeJoyError>;
