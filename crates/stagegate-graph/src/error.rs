//! Error types for workflow graph loading
//!
//! Only document-level problems are errors. Problems inside individual nodes
//! are reported as [`ValidationIssue`](crate::ValidationIssue)s and absorbed.

use thiserror::Error;

/// Workflow graph loading errors.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The document is not valid JSON
    #[error("Failed to parse workflow document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document is JSON but not a workflow (neither an object nor a node list)
    #[error("Invalid workflow document: {0}")]
    InvalidDocument(String),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphError::Parse(_) => "WORKFLOW_PARSE_ERROR",
            GraphError::InvalidDocument(_) => "WORKFLOW_INVALID_DOCUMENT",
        }
    }
}
