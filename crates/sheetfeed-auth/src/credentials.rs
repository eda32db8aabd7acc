//! Stored OAuth credentials.

use crate::AuthError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// OAuth credentials as kept in the credential store.
///
/// The JSON layout matches the token files written by common OAuth client
/// libraries, so existing files can be reused. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token for API calls
    pub access_token: String,
    /// Long-lived token used to obtain new access tokens
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token stops working
    #[serde(default)]
    pub token_expiry: Option<DateTime<Utc>>,
    /// OAuth client id the tokens were issued to
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret
    #[serde(default)]
    pub client_secret: String,
    /// Token endpoint
    #[serde(default)]
    pub token_uri: String,
    /// Set once a refresh has been rejected
    #[serde(default)]
    pub invalid: bool,
}

impl Credentials {
    /// Whether the access token is expired at `now`.
    ///
    /// Invalid credentials always count as expired; credentials without an
    /// expiry never do.
    pub fn access_token_expired_at(&self, now: DateTime<Utc>) -> bool {
        if self.invalid {
            return true;
        }
        self.token_expiry.is_some_and(|expiry| now >= expiry)
    }

    /// Whether the access token is expired now.
    pub fn access_token_expired(&self) -> bool {
        self.access_token_expired_at(Utc::now())
    }

    /// Value for an `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Creates a store at `path`. Nothing is read until [`CredentialStore::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads stored credentials; `None` when the file does not exist.
    pub fn load(&self) -> Result<Option<Credentials>, AuthError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuthError::io(e, &self.path)),
        };
        let credentials = serde_json::from_str(&json)?;
        tracing::debug!(path = %self.path.display(), "Loaded stored credentials");
        Ok(Some(credentials))
    }

    /// Writes credentials, replacing the file.
    pub fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AuthError::io(e, parent))?;
        }
        let json = serde_json::to_string_pretty(credentials)?;
        std::fs::write(&self.path, json).map_err(|e| AuthError::io(e, &self.path))?;
        tracing::debug!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }
}
