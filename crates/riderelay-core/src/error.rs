use thiserror::Error;

/// Application-wide error types for RideRelay.
#[derive(Error, Debug)]
pub enum AppError {
    /// Access token missing, malformed, tampered with or expired.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed to see the requested data.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Path identifier is not a valid document id.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// No document exists for the identifier.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request data is well-formed JSON but semantically invalid.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Signing a token failed.
    #[error("Token error: {0}")]
    TokenError(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true for failures caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AppError::TokenError(_) | AppError::DatabaseError(_) | AppError::ConfigError(_)
        )
    }
}
