//! HTTP implementation of [`FeedClient`].

use crate::atom;
use crate::config::{ClientConfig, GDATA_VERSION};
use crate::error::{Error, transport};
use crate::gdata;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, IF_MATCH};
use reqwest::{RequestBuilder, StatusCode};
use sheetfeed_core::types::{
    BatchOutcome, CellBatch, CellEntry, CellsFeed, ListEntry, ListQuery, SpreadsheetEntry,
    WorksheetEntry,
};
use sheetfeed_core::FeedClient;
use std::collections::BTreeMap;
use std::fmt;

/// Longest error body kept in [`sheetfeed_core::Error::Service`].
const MAX_ERROR_BODY: usize = 512;

const ALT_JSON: [(&str, &str); 1] = [("alt", "json")];

/// Talks to the spreadsheet feeds over HTTPS with a bearer token.
///
/// The token is captured at construction; build a new client after
/// refreshing credentials.
#[derive(Clone)]
pub struct HttpFeedClient {
    http: reqwest::Client,
    config: ClientConfig,
    access_token: String,
}

impl fmt::Debug for HttpFeedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFeedClient")
            .field("feeds_url", &self.config.feeds_url)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl HttpFeedClient {
    /// Creates a client for `access_token` using `config`.
    pub fn new(config: ClientConfig, access_token: impl Into<String>) -> crate::Result<Self> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(Error::InvalidConfig("access token is empty".to_string()));
        }
        if config.feeds_url.is_empty() {
            return Err(Error::InvalidConfig("feeds URL is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            config,
            access_token,
        })
    }

    /// Creates a client against the default feeds endpoint.
    pub fn with_token(access_token: impl Into<String>) -> crate::Result<Self> {
        Self::new(ClientConfig::default(), access_token)
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, request: RequestBuilder) -> sheetfeed_core::Result<String> {
        let response = request
            .bearer_auth(&self.access_token)
            .header("GData-Version", GDATA_VERSION)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), url = %url, "Feed request failed");
            return Err(sheetfeed_core::Error::service(
                status.as_u16(),
                truncate(body),
            ));
        }
        Ok(body)
    }

    async fn get(&self, url: &str, params: &[(&str, String)]) -> sheetfeed_core::Result<String> {
        tracing::debug!(url = %url, "GET");
        self.send(self.http.get(url).query(&ALT_JSON).query(params))
            .await
    }

    fn atom(&self, request: RequestBuilder, body: String) -> RequestBuilder {
        request
            .query(&ALT_JSON)
            .header(CONTENT_TYPE, atom::CONTENT_TYPE)
            .body(body)
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn spreadsheets_feed(&self) -> sheetfeed_core::Result<Vec<SpreadsheetEntry>> {
        let body = self.get(&self.config.spreadsheets_url(), &[]).await?;
        gdata::spreadsheets(&body)
    }

    async fn worksheets_feed(
        &self,
        spreadsheet_key: &str,
    ) -> sheetfeed_core::Result<Vec<WorksheetEntry>> {
        let body = self
            .get(&self.config.worksheets_url(spreadsheet_key), &[])
            .await?;
        gdata::worksheets(&body)
    }

    async fn cells_feed(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
    ) -> sheetfeed_core::Result<CellsFeed> {
        let body = self
            .get(&self.config.cells_url(spreadsheet_key, worksheet_key), &[])
            .await?;
        let feed = gdata::cells(&body)?;
        tracing::debug!(cells = feed.entries.len(), "Fetched cells feed");
        Ok(feed)
    }

    async fn list_feed(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        query: Option<&ListQuery>,
    ) -> sheetfeed_core::Result<Vec<ListEntry>> {
        let params = query.map(ListQuery::to_params).unwrap_or_default();
        let body = self
            .get(&self.config.list_url(spreadsheet_key, worksheet_key), &params)
            .await?;
        let rows = gdata::list(&body)?;
        tracing::debug!(rows = rows.len(), query = ?query, "Fetched list feed");
        Ok(rows)
    }

    async fn list_entry(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        row_id: &str,
    ) -> sheetfeed_core::Result<Option<ListEntry>> {
        let url = format!(
            "{}/{row_id}",
            self.config.list_url(spreadsheet_key, worksheet_key)
        );
        match self.get(&url, &[]).await {
            Ok(body) => gdata::list_entry(&body).map(Some),
            Err(sheetfeed_core::Error::Service { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn insert_row(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        values: &BTreeMap<String, String>,
    ) -> sheetfeed_core::Result<ListEntry> {
        let url = self.config.list_url(spreadsheet_key, worksheet_key);
        let body = atom::list_entry(None, values)?;
        tracing::debug!(url = %url, columns = values.len(), "Inserting row");
        let reply = self.send(self.atom(self.http.post(&url), body)).await?;
        gdata::list_entry(&reply)
    }

    async fn update_row(
        &self,
        entry: &ListEntry,
        values: &BTreeMap<String, String>,
    ) -> sheetfeed_core::Result<ListEntry> {
        let body = atom::list_entry(Some(&entry.id), values)?;
        tracing::debug!(row_id = %entry.row_id(), "Updating row");
        let request = self
            .atom(self.http.put(&entry.edit_link), body)
            .header(IF_MATCH, "*");
        let reply = self.send(request).await?;
        gdata::list_entry(&reply)
    }

    async fn delete_row(&self, entry: &ListEntry) -> sheetfeed_core::Result<()> {
        tracing::debug!(row_id = %entry.row_id(), "Deleting row");
        self.send(self.http.delete(&entry.edit_link).header(IF_MATCH, "*"))
            .await?;
        Ok(())
    }

    async fn update_cell(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        row: u32,
        col: u32,
        value: &str,
    ) -> sheetfeed_core::Result<CellEntry> {
        let url = self
            .config
            .cell_url(spreadsheet_key, worksheet_key, row, col);
        tracing::debug!(row, col, "Updating cell");
        let request = self
            .atom(self.http.put(&url), atom::cell_entry(&url, row, col, value))
            .header(IF_MATCH, "*");
        let reply = self.send(request).await?;
        gdata::cell(&reply)
    }

    async fn execute_batch(
        &self,
        batch: &CellBatch,
        batch_link: &str,
    ) -> sheetfeed_core::Result<BatchOutcome> {
        let body = atom::batch_feed(batch_link, batch.updates());
        tracing::debug!(cells = batch.len(), "Executing cell batch");
        let request = self
            .atom(self.http.post(batch_link), body)
            .header(IF_MATCH, "*");
        let reply = self.send(request).await?;
        Ok(BatchOutcome {
            statuses: gdata::batch_statuses(&reply)?,
        })
    }
}
