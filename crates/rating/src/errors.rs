//! Error types for the rating service client.

use thiserror::Error;

/// Errors that can occur while talking to the remote rating service.
///
/// Transport problems and server-side rejections are kept distinct so the
/// consuming layer can decide whether a failure is retryable or a contract
/// mismatch.
#[derive(Error, Debug)]
pub enum RatingClientError {
    /// The request never produced a usable HTTP response
    /// (connection refused, DNS failure, request build error).
    #[error("Rating service unreachable: {0}")]
    Http(String),

    /// The service answered with a non-2xx status.
    #[error("Rating service error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the service
        status: u16,
        /// Response body, or a placeholder when the body could not be read
        message: String,
    },

    /// The response body could not be deserialized into the expected shape.
    #[error("Failed to parse rating service response: {0}")]
    Parse(String),

    /// The client was constructed with an invalid base URL.
    #[error("Invalid rating service URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for RatingClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RatingClientError::Parse(err.to_string())
        } else {
            RatingClientError::Http(err.to_string())
        }
    }
}
