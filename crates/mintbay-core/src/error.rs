use thiserror::Error;

/// Application-wide error types for Mintbay.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The operation conflicts with current state (duplicate key, stale bid, ...).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Access or refresh token could not be verified.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Password hashing/verification failed.
    #[error("Credential error: {0}")]
    CredentialError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if the error is caused by the client's request rather
    /// than a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::Unauthorized(_)
                | AppError::Forbidden(_)
                | AppError::NotFound(_)
                | AppError::Conflict(_)
                | AppError::InvalidToken(_)
        )
    }

    /// Convenience constructor for not-found errors on a named entity.
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(entity.to_string())
    }
}
