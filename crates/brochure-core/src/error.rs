use thiserror::Error;

/// Application-wide error types for the brochure pipeline.
#[derive(Error, Debug)]
pub enum AppError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// HTTP request failed for a reason other than status or connectivity.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// HTML could not be turned into a page.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// LLM API call failed.
    #[error("LLM error (HTTP {status_code}): {message}")]
    LlmError { message: String, status_code: u16 },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// A streaming response broke off or carried malformed data.
    #[error("Stream error: {0}")]
    StreamError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The caller supplied a request that cannot be processed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if this error must stop the request before any pipeline work.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::ConfigError(_) | AppError::InvalidInput(_))
    }
}
