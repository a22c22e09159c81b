use std::time::Duration;
use thiserror::Error;

/// Errors produced anywhere in the capture pipeline
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Malformed URL or a scheme other than http/https
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Target host is on the local/private network denylist
    #[error("Blocked host `{0}`: local and private network URLs are not allowed")]
    BlockedHost(String),

    /// The request did not complete within the configured duration
    #[error("Request timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {status_text}")]
    HttpError { status: u16, status_text: String },

    /// DNS, connection or body-read failure
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Reserved for document failures (the HTML parser itself is lenient)
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The enhancement service failed or returned nothing usable
    #[error("Enhancement failed: {0}")]
    Enhancement(String),
}

impl From<serde_json::Error> for CaptureError {
    fn from(e: serde_json::Error) -> Self {
        CaptureError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;
