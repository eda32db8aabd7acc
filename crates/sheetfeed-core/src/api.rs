//! Entry point for listing spreadsheets and opening worksheets.

use crate::client::FeedClient;
use crate::worksheet::Worksheet;
use crate::Result;
use std::sync::Arc;

/// Spreadsheet service wrapper around a [`FeedClient`].
#[derive(Clone)]
pub struct SpreadsheetApi {
    client: Arc<dyn FeedClient>,
}

impl SpreadsheetApi {
    /// Creates an API wrapper over an already-authenticated client.
    pub fn new(client: Arc<dyn FeedClient>) -> Self {
        Self { client }
    }

    /// The underlying feed client.
    pub fn client(&self) -> &Arc<dyn FeedClient> {
        &self.client
    }

    /// Lists spreadsheets as `(title, key)` pairs.
    pub async fn list_spreadsheets(&self) -> Result<Vec<(String, String)>> {
        let sheets = self.client.spreadsheets_feed().await?;
        tracing::debug!(count = sheets.len(), "Listed spreadsheets");
        Ok(sheets
            .iter()
            .map(|s| (s.title.clone(), s.key().to_string()))
            .collect())
    }

    /// Lists the worksheets of a spreadsheet as `(title, key)` pairs.
    pub async fn list_worksheets(&self, spreadsheet_key: &str) -> Result<Vec<(String, String)>> {
        let worksheets = self.client.worksheets_feed(spreadsheet_key).await?;
        tracing::debug!(
            spreadsheet = %spreadsheet_key,
            count = worksheets.len(),
            "Listed worksheets"
        );
        Ok(worksheets
            .iter()
            .map(|w| (w.title.clone(), w.key().to_string()))
            .collect())
    }

    /// Opens a worksheet.
    pub async fn get_worksheet(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
    ) -> Result<Worksheet> {
        Worksheet::open(self.client.clone(), spreadsheet_key, worksheet_key).await
    }
}
