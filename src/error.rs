//! Unified error type for dietrs
//!
//! Every fallible library operation returns [`Result`], carrying a [`DietError`]
//! that distinguishes caller mistakes (invalid arguments) from mathematically
//! unreachable inputs (domain errors).

use thiserror::Error;

/// Top-level error type for all dietrs operations
#[derive(Debug, Error)]
pub enum DietError {
    /// Unrecognized token or out-of-range parameter supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Inverse formula fed a target it cannot reach
    #[error("Domain error in {calculation}: {reason}")]
    Domain { calculation: String, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Chart rendering errors
    #[error("Chart error: {0}")]
    Chart(String),

    /// Serialization errors (CSV/JSON export)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for dietrs operations
pub type Result<T> = std::result::Result<T, DietError>;

impl DietError {
    /// Shorthand for a domain error raised by `calculation`
    pub fn domain(calculation: impl Into<String>, reason: impl Into<String>) -> Self {
        DietError::Domain {
            calculation: calculation.into(),
            reason: reason.into(),
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DietError::InvalidArgument(_) => ErrorSeverity::Error,
            DietError::Domain { .. } => ErrorSeverity::Warning,
            DietError::Configuration(_) => ErrorSeverity::Warning,
            DietError::Chart(_) => ErrorSeverity::Warning,
            DietError::Serialization(_) | DietError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            DietError::Domain { calculation, reason } => {
                format!("The target cannot be reached ({}): {}", calculation, reason)
            }
            DietError::InvalidArgument(reason) => {
                format!("Please check your input: {}", reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that aborts the current operation
    Error,
    /// Warning that the caller can act on
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
