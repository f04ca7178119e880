//! Unified error types for the study pipeline.

use tokio_rusqlite::rusqlite;

/// Unified error types for the study pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty activity text).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Input was classified as not being an economic activity.
    ///
    /// User-correctable; carries guidance text for the caller.
    #[error("REJECTED: {0}")]
    Rejected(String),

    /// Remote study generation failed or timed out.
    ///
    /// Retryable by resubmitting the same request; nothing is persisted.
    #[error("GENERATION_FAILED: {0}")]
    Generation(String),

    /// Database operation failed.
    #[error("ARCHIVE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("ARCHIVE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl Error {
    /// Stable machine-readable tag for the HTTP error payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::Rejected(_) => "rejected",
            Error::Generation(_) => "generation_failed",
            Error::Database(_) | Error::MigrationFailed(_) => "archive_error",
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Rejected("not an economic activity".to_string());
        assert!(err.to_string().contains("REJECTED"));
        assert!(err.to_string().contains("not an economic activity"));
    }

    #[test]
    fn test_error_kind_tags() {
        assert_eq!(Error::InvalidInput("x".into()).kind(), "invalid_input");
        assert_eq!(Error::Rejected("x".into()).kind(), "rejected");
        assert_eq!(Error::Generation("x".into()).kind(), "generation_failed");
        assert_eq!(Error::MigrationFailed("x".into()).kind(), "archive_error");
    }
}
