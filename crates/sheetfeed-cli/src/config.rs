//! Sheetfeed configuration file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sheetfeed_auth::AuthConfig;
use sheetfeed_client::{ClientConfig, DEFAULT_FEEDS_URL};
use std::path::{Path, PathBuf};

/// Name used for the config directory and in user-facing hints.
pub const PROJECT_NAME: &str = "sheetfeed";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "SHEETFEED_CONFIG";

/// Contents of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetfeedConfig {
    /// OAuth client secrets file
    pub client_secrets_file: PathBuf,
    /// Stored credentials file
    pub credentials_file: PathBuf,
    /// Feeds endpoint
    pub feeds_url: String,
}

impl Default for SheetfeedConfig {
    fn default() -> Self {
        let auth = AuthConfig::default();
        Self {
            client_secrets_file: auth.client_secrets_file,
            credentials_file: auth.credentials_file,
            feeds_url: DEFAULT_FEEDS_URL.to_string(),
        }
    }
}

impl SheetfeedConfig {
    /// `<config dir>/sheetfeed/config.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(PROJECT_NAME).join("config.toml"))
    }

    /// The explicit path if given, else the default path.
    ///
    /// `SHEETFEED_CONFIG` reaches this as the explicit path through clap.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        match explicit {
            Some(p) => Some(PathBuf::from(p)),
            None => Self::default_config_path(),
        }
    }

    /// Loads the resolved config file; a missing file yields the defaults.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Parses a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Renders the config as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Credential locations for [`sheetfeed_auth::authorize`].
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            client_secrets_file: self.client_secrets_file.clone(),
            credentials_file: self.credentials_file.clone(),
        }
    }

    /// HTTP client settings.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default().with_feeds_url(self.feeds_url.clone())
    }
}
