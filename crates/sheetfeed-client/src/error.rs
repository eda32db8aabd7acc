//! Error types for sheetfeed-client

use thiserror::Error;

/// Result type alias for sheetfeed-client construction
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building an HTTP feed client
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration is unusable
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl From<Error> for sheetfeed_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Http(e) => transport(e),
            Error::InvalidConfig(message) => sheetfeed_core::Error::validation(message),
        }
    }
}

/// Maps a transport-level failure into the core error type.
pub(crate) fn transport(err: reqwest::Error) -> sheetfeed_core::Error {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        "request failed".to_string()
    };
    sheetfeed_core::Error::transport_with_source(message, err)
}
