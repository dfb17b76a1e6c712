//! Error types for the productivity mesh

use thiserror::Error;

/// Result type alias for mesh operations
pub type Result<T> = std::result::Result<T, MeshError>;

#[derive(Error, Debug)]
pub enum MeshError {

    // =============================
    // Request Errors
    // =============================

    #[error("Unknown type")]
    UnknownRequestType(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    // =============================
    // Delegate Errors
    // =============================

    #[error("Agent error: {0}")]
    AgentError(String),

    #[error("Agent not configured")]
    AgentNotConfigured,

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MeshError {
    /// Whether the error is the caller's fault (maps to HTTP 400)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MeshError::UnknownRequestType(_) | MeshError::InvalidPayload(_)
        )
    }
}
