//! Error types for pair-relay.
//!
//! The taxonomy is deliberately narrow: caller misuse (missing key, oversized
//! payload) is rejected at the HTTP boundary with a status code and never
//! reaches the core, and a receive timeout is absence, not an error.

/// Main error type for pair-relay operations.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
