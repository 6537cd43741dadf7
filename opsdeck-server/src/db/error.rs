use crate::models::ValidationError;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// No connection pool could be created for this process
    #[error("database not available")]
    Unavailable,

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
