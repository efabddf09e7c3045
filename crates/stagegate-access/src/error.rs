//! Error types for access resolution
//!
//! Only caller contract violations are errors. A missing dependency is an
//! unavailable decision, and a missing rule is a configuration gap; neither
//! crosses the resolver boundary as an error.

use thiserror::Error;

/// Access resolution error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A required input was omitted by the caller
    #[error("Input contract violated: {0}")]
    InputContract(String),
}

/// Result type for access resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

impl ResolveError {
    /// Shorthand for the missing module type violation.
    pub fn missing_module_type() -> Self {
        ResolveError::InputContract("module type is required".to_string())
    }

    /// Check if retrying the same call could succeed.
    ///
    /// Contract violations never do.
    pub fn is_retryable(&self) -> bool {
        match self {
            ResolveError::InputContract(_) => false,
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ResolveError::InputContract(_) => 400,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ResolveError::InputContract(_) => "INPUT_CONTRACT",
        }
    }
}
