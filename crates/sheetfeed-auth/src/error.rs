//! Auth-specific error types.

use std::path::PathBuf;

/// Errors that can occur while loading or refreshing credentials.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No usable credentials are stored.
    #[error(
        "no valid credentials in {path}; authorize with the client secrets in {secrets} \
         and store the result there"
    )]
    NoCredentials {
        /// Credential store location
        path: PathBuf,
        /// Client secrets file that would be used to authorize
        secrets: PathBuf,
    },

    /// The client secrets file is unusable.
    #[error("invalid client secrets file {path}: {message}")]
    InvalidSecrets {
        /// Client secrets file
        path: PathBuf,
        /// What is wrong with it
        message: String,
    },

    /// Credentials lack a refresh token, so they cannot be renewed.
    #[error("credentials have no refresh token")]
    MissingRefreshToken,

    /// The token endpoint rejected the refresh.
    #[error("token refresh failed ({status}): {body}")]
    RefreshFailed {
        /// HTTP status returned by the token endpoint
        status: u16,
        /// Response body
        body: String,
    },

    /// Could not reach the token endpoint.
    #[error("token endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Credential or secrets file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Credential JSON could not be parsed or produced.
    #[error("credential serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        AuthError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether re-running authorization is required to recover.
    pub fn needs_authorization(&self) -> bool {
        matches!(
            self,
            AuthError::NoCredentials { .. }
                | AuthError::MissingRefreshToken
                | AuthError::RefreshFailed { status: 400 | 401, .. }
        )
    }
}

impl From<AuthError> for sheetfeed_core::Error {
    fn from(err: AuthError) -> Self {
        sheetfeed_core::Error::auth(err.to_string())
    }
}
