//! Error types for sheetfeed-cli

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for sheetfeed-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sheetfeed-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from sheetfeed-core
    #[error(transparent)]
    Core(#[from] sheetfeed_core::Error),

    /// Error from sheetfeed-auth
    #[error(transparent)]
    Auth(#[from] sheetfeed_auth::AuthError),

    /// Error from sheetfeed-client
    #[error(transparent)]
    Client(#[from] sheetfeed_client::Error),

    /// Configuration problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed command-line argument
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// File access failed
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Writing command output failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Row serialization failed
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates an argument error.
    pub fn argument(message: impl Into<String>) -> Self {
        Error::Argument(message.into())
    }

    /// Wraps an I/O error with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: &Path) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
