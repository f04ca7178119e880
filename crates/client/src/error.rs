//! Remote provider client error types.

use std::sync::Arc;

/// Errors from the classification and generation provider clients.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Missing API key for the provider.
    #[error("missing API key: {0} not set")]
    MissingApiKey(&'static str),

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited by the provider.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// The provider returned a response with no usable text.
    #[error("empty completion from provider")]
    EmptyCompletion,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ProviderError::Timeout } else { ProviderError::Network(Arc::new(err)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::MissingApiKey("DIRASA_CLASSIFIER_API_KEY");
        assert!(err.to_string().contains("API key"));
        assert!(err.to_string().contains("DIRASA_CLASSIFIER_API_KEY"));

        let err = ProviderError::HttpError { status: 503 };
        assert!(err.to_string().contains("503"));
    }
}
