//! Access token renewal through the `refresh_token` grant.

use crate::credentials::Credentials;
use crate::secrets::DEFAULT_TOKEN_URI;
use crate::AuthError;
use chrono::{Duration, Utc};
use serde::Deserialize;

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Renews access tokens against an OAuth token endpoint.
#[derive(Debug, Clone, Default)]
pub struct TokenRefresher {
    http: reqwest::Client,
}

impl TokenRefresher {
    /// Creates a refresher with a fresh HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a refresher reusing an HTTP client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// Returns updated credentials; the input is left untouched. A 400/401
    /// from the endpoint marks the returned error as requiring
    /// re-authorization.
    pub async fn refresh(&self, credentials: &Credentials) -> Result<Credentials, AuthError> {
        let refresh_token = credentials
            .refresh_token
            .as_deref()
            .ok_or(AuthError::MissingRefreshToken)?;
        let token_uri = if credentials.token_uri.is_empty() {
            DEFAULT_TOKEN_URI
        } else {
            credentials.token_uri.as_str()
        };

        tracing::debug!(token_uri = %token_uri, "Refreshing access token");

        let response = self
            .http
            .post(token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Token refresh rejected");
            return Err(AuthError::RefreshFailed {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        let mut refreshed = credentials.clone();
        refreshed.access_token = token.access_token;
        refreshed.token_expiry = token
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));
        if let Some(rotated) = token.refresh_token {
            refreshed.refresh_token = Some(rotated);
        }
        refreshed.invalid = false;

        tracing::info!(expiry = ?refreshed.token_expiry, "Access token refreshed");
        Ok(refreshed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn creds(token_uri: String) -> Credentials {
        Credentials {
            access_token: "old".into(),
            refresh_token: Some("1/refresh".into()),
            client_id: "client".into(),
            client_secret: "secret".into(),
            token_uri,
            ..Credentials::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_updates_token_and_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=1%2Frefresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "new",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let refreshed = TokenRefresher::new()
            .refresh(&creds(format!("{}/token", server.uri())))
            .await
            .unwrap();

        assert_eq!(refreshed.access_token, "new");
        assert_eq!(refreshed.refresh_token.as_deref(), Some("1/refresh"));
        assert!(!refreshed.access_token_expired());
    }

    #[tokio::test]
    async fn test_refresh_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
            )
            .mount(&server)
            .await;

        let err = TokenRefresher::new()
            .refresh(&creds(format!("{}/token", server.uri())))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AuthError::RefreshFailed { status: 400, ref body } if body.contains("invalid_grant")
        ));
        assert!(err.needs_authorization());
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let mut c = creds(String::new());
        c.refresh_token = None;
        let err = TokenRefresher::new().refresh(&c).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingRefreshToken));
    }
}
