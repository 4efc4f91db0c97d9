//! Error types for reference-data operations

use thiserror::Error;

/// Result type alias for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors from the reference-data provider
#[derive(Debug, Error)]
pub enum DataError {
    /// The provider has no data for the symbol/resource pair
    #[error("no {resource} data found for {symbol}")]
    NotFound { symbol: String, resource: String },

    /// Invalid ticker symbol provided
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Provider rate limit exceeded
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// Provider-side failure (5xx)
    #[error("server error: {0}")]
    ServerError(String),

    /// Error message embedded in the provider's response body
    #[error("API error: {0}")]
    ApiError(String),

    /// Network or HTTP error
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl DataError {
    /// Whether the failure is worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::RateLimited(_) | DataError::ServerError(_) => true,
            DataError::NetworkError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Convenience constructor for missing data
    pub fn not_found(symbol: impl Into<String>, resource: impl Into<String>) -> Self {
        DataError::NotFound {
            symbol: symbol.into(),
            resource: resource.into(),
        }
    }
}

/// Convert DataError into the core taxonomy for task-level reporting
impl From<DataError> for oracle_core::Error {
    fn from(err: DataError) -> Self {
        if err.is_transient() {
            oracle_core::Error::Transient(err.to_string())
        } else {
            oracle_core::Error::Permanent(err.to_string())
        }
    }
}
