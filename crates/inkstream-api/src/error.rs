use thiserror::Error;

/// Errors produced by the REST layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: connection, TLS, timeout, or body decode.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server returned {status} for {path}")]
    Status { status: u16, path: String },
}
