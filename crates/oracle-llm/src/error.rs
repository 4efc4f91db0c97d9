//! Error types for LLM operations

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed (server-side or transport level)
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Whether the failure is worth retrying
    ///
    /// Rate limits, server-side failures, and transport errors are
    /// recoverable; authentication and request-shape problems are not.
    pub fn is_transient(&self) -> bool {
        match self {
            LLMError::RequestFailed(_) | LLMError::RateLimitExceeded(_) => true,
            LLMError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LLMError::RequestFailed("503".to_string()).is_transient());
        assert!(LLMError::RateLimitExceeded("slow down".to_string()).is_transient());
        assert!(!LLMError::AuthenticationFailed.is_transient());
        assert!(!LLMError::InvalidRequest("bad".to_string()).is_transient());
        assert!(!LLMError::ModelNotFound("gpt-0".to_string()).is_transient());
    }
}
