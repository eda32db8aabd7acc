//! HTTP feed client configuration.

use std::time::Duration;

/// Default feeds endpoint.
pub const DEFAULT_FEEDS_URL: &str = "https://spreadsheets.google.com/feeds";

/// Protocol version sent with every request.
pub const GDATA_VERSION: &str = "3.0";

/// Settings for [`HttpFeedClient`](crate::HttpFeedClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the feeds, without a trailing slash
    pub feeds_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            feeds_url: DEFAULT_FEEDS_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("sheetfeed/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Uses a different feeds endpoint.
    pub fn with_feeds_url(mut self, url: impl Into<String>) -> Self {
        self.feeds_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn spreadsheets_url(&self) -> String {
        format!("{}/spreadsheets/private/full", self.feeds_url)
    }

    pub(crate) fn worksheets_url(&self, spreadsheet_key: &str) -> String {
        format!("{}/worksheets/{spreadsheet_key}/private/full", self.feeds_url)
    }

    pub(crate) fn cells_url(&self, spreadsheet_key: &str, worksheet_key: &str) -> String {
        format!(
            "{}/cells/{spreadsheet_key}/{worksheet_key}/private/full",
            self.feeds_url
        )
    }

    pub(crate) fn cell_url(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        row: u32,
        col: u32,
    ) -> String {
        format!("{}/R{row}C{col}", self.cells_url(spreadsheet_key, worksheet_key))
    }

    pub(crate) fn list_url(&self, spreadsheet_key: &str, worksheet_key: &str) -> String {
        format!(
            "{}/list/{spreadsheet_key}/{worksheet_key}/private/full",
            self.feeds_url
        )
    }
}
