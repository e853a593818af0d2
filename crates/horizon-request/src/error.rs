//! Error types for request construction and execution.

/// A specialized Result type for request operations.
pub type Result<T> = std::result::Result<T, RequestError>;

/// Errors produced while building or sending a request.
///
/// Transport failures are carried through untouched in [`RequestError::Transport`];
/// nothing here is retried or reclassified.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The target URL (after appending query parameters) could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid header name or value, or an invalid MIME type on a file field.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The proxy URL was rejected.
    #[error("Invalid proxy '{url}': {source}")]
    Proxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a file-field stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the underlying HTTP client.
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// HTTP error status (4xx or 5xx), only produced by `error_for_status`.
    #[error("HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// Optional error message from the response body.
        message: Option<String>,
    },
}

impl RequestError {
    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader(message.into())
    }

    /// Whether the underlying client reported a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }

    /// Whether the underlying client failed to connect.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_connect())
    }
}

impl From<http::header::InvalidHeaderName> for RequestError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for RequestError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}
