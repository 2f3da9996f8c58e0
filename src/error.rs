//! Error types for lesson-coherence
//!
//! Centralized error handling using thiserror. Evaluators never produce these:
//! incomplete activities are scored, not rejected. Errors are reserved for
//! contract violations at the boundary.

use thiserror::Error;

/// All error types that can occur in lesson-coherence
#[derive(Debug, Error)]
pub enum CoherenceError {
    /// Rule tables missing or internally inconsistent
    #[error("Rule tables invalid: {0}")]
    Rules(String),

    /// Input does not match the expected schema
    #[error("Schema violation: {0}")]
    Schema(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for lesson-coherence operations
pub type Result<T> = std::result::Result<T, CoherenceError>;
