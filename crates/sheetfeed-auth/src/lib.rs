//! OAuth2 credentials for Sheetfeed.
//!
//! Provides:
//! - [`ClientSecrets`]: the client section of a secrets file
//! - [`Credentials`] / [`CredentialStore`]: tokens persisted between runs
//! - [`TokenRefresher`]: renewal through the `refresh_token` grant
//! - [`authorize`]: load, refresh if expired, persist, return the token
//!
//! Obtaining the first set of credentials (the browser consent flow) is out
//! of scope; a token file produced by any OAuth client library works.

mod credentials;
mod error;
mod refresh;
mod secrets;

pub use credentials::{CredentialStore, Credentials};
pub use error::AuthError;
pub use refresh::TokenRefresher;
pub use secrets::{ClientSecrets, DEFAULT_TOKEN_URI};

use std::path::PathBuf;

/// OAuth scope granting access to the spreadsheet feeds.
pub const SPREADSHEETS_SCOPE: &str = "https://spreadsheets.google.com/feeds";

/// Where credentials and client secrets live.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Client secrets file
    pub client_secrets_file: PathBuf,
    /// Credential store file
    pub credentials_file: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_secrets_file: PathBuf::from("./client_secrets.json"),
            credentials_file: PathBuf::from("./creds.dat"),
        }
    }
}

/// Returns valid credentials, refreshing and persisting them if expired.
///
/// Fails with [`AuthError::NoCredentials`] when the store is empty or holds
/// credentials already marked invalid. Client id/secret missing from the
/// stored credentials are taken from the client secrets file.
pub async fn authorize(
    config: &AuthConfig,
    refresher: &TokenRefresher,
) -> Result<Credentials, AuthError> {
    let store = CredentialStore::new(&config.credentials_file);
    let mut credentials = match store.load()? {
        Some(c) if !c.invalid => c,
        _ => {
            return Err(AuthError::NoCredentials {
                path: config.credentials_file.clone(),
                secrets: config.client_secrets_file.clone(),
            });
        }
    };

    if !credentials.access_token_expired() {
        return Ok(credentials);
    }

    if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
        let secrets = ClientSecrets::from_file(&config.client_secrets_file)?;
        credentials.client_id = secrets.client_id;
        credentials.client_secret = secrets.client_secret;
        if credentials.token_uri.is_empty() {
            credentials.token_uri = secrets.token_uri;
        }
    }

    match refresher.refresh(&credentials).await {
        Ok(refreshed) => {
            store.save(&refreshed)?;
            Ok(refreshed)
        }
        Err(err) => {
            if err.needs_authorization() {
                credentials.invalid = true;
                store.save(&credentials)?;
            }
            Err(err)
        }
    }
}
