//! OAuth client secrets files.

use crate::AuthError;
use serde::Deserialize;
use std::path::Path;

/// Default token endpoint when the secrets file omits one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The client section of a secrets file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Authorization endpoint
    #[serde(default)]
    pub auth_uri: Option<String>,
    /// Token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Registered redirect URIs
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Secrets files wrap the client in an `installed` or `web` section.
#[derive(Debug, Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Parses a secrets document.
    pub fn from_json(json: &str, path: &Path) -> Result<Self, AuthError> {
        let file: SecretsFile =
            serde_json::from_str(json).map_err(|e| AuthError::InvalidSecrets {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        file.installed
            .or(file.web)
            .ok_or_else(|| AuthError::InvalidSecrets {
                path: path.to_path_buf(),
                message: "expected an 'installed' or 'web' section".to_string(),
            })
    }

    /// Reads a secrets file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| AuthError::io(e, path))?;
        Self::from_json(&json, path)
    }
}
