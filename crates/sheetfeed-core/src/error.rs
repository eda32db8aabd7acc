//! Error types for the Sheetfeed core library.

/// Errors that can occur while talking to the spreadsheet service.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The service answered with a non-success status.
    #[error("Service error ({status}): {body}")]
    Service {
        /// HTTP status code returned by the service
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Transport failure (connection refused, TLS, timeouts, etc.)
    #[error("Transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication or credential error
    #[error("Authentication error: {message}")]
    Auth {
        /// What went wrong
        message: String,
    },

    /// A feed response was missing an expected field
    #[error("Malformed feed: {message}")]
    MalformedFeed {
        /// Which field or element was missing
        message: String,
    },

    /// Caller-supplied data failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Field or aspect that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// Row id lookup failed in both the cache and the service
    #[error("Row ID '{id}' not found.")]
    RowNotFound {
        /// Row id that was not found
        id: String,
    },

    /// Index-based row access outside the cached result set
    #[error("Row index {index} out of range ({len} rows)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of rows in the cached result set
        len: usize,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type alias for Sheetfeed operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error is retryable.
    ///
    /// Transport failures and 5xx/429 service responses are transient;
    /// everything else is a permanent failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Service { status, .. } => *status == 429 || *status >= 500,
            Error::Transport { .. } => true,
            Error::Io(_) => true,
            Error::Auth { .. } => false,
            Error::MalformedFeed { .. } => false,
            Error::Validation { .. } => false,
            Error::RowNotFound { .. } => false,
            Error::IndexOutOfRange { .. } => false,
            Error::Serialization(_) => false,
        }
    }

    /// Creates a new service error from a status code and response body.
    pub fn service<S: Into<String>>(status: u16, body: S) -> Self {
        Error::Service {
            status,
            body: body.into(),
        }
    }

    /// Creates a new transport error with a message.
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Error::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new transport error with a message and source error.
    pub fn transport_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Error::Auth {
            message: message.into(),
        }
    }

    /// Creates a new malformed-feed error.
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Error::MalformedFeed {
            message: message.into(),
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}
