//! Failures talking to the vending API.

/// Error returned by [`ApiClient`](super::ApiClient) operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Vending API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Vending API rejected the request: {0}")]
    Rejected(String),

    #[error("Vending API response is missing data")]
    MissingData,
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
