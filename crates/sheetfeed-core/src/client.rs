//! The feed client seam.
//!
//! Everything above this trait is backend-agnostic. `sheetfeed-client`
//! provides the HTTP implementation; [`MemoryFeedClient`](crate::memory::MemoryFeedClient)
//! provides an in-process one.

use crate::types::{
    BatchOutcome, CellBatch, CellEntry, CellsFeed, ListEntry, ListQuery, SpreadsheetEntry,
    WorksheetEntry,
};
use crate::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Operations offered by the spreadsheet feeds service.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Lists spreadsheets visible to the authenticated account.
    async fn spreadsheets_feed(&self) -> Result<Vec<SpreadsheetEntry>>;

    /// Lists worksheets of a spreadsheet.
    async fn worksheets_feed(&self, spreadsheet_key: &str) -> Result<Vec<WorksheetEntry>>;

    /// Fetches every non-empty cell of a worksheet.
    async fn cells_feed(&self, spreadsheet_key: &str, worksheet_key: &str) -> Result<CellsFeed>;

    /// Fetches list feed rows, optionally filtered/ordered by the service.
    async fn list_feed(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        query: Option<&ListQuery>,
    ) -> Result<Vec<ListEntry>>;

    /// Fetches one list feed row by id; `None` if it does not exist.
    async fn list_entry(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        row_id: &str,
    ) -> Result<Option<ListEntry>>;

    /// Appends a row after the last non-empty row.
    async fn insert_row(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        values: &BTreeMap<String, String>,
    ) -> Result<ListEntry>;

    /// Replaces a row's values.
    async fn update_row(
        &self,
        entry: &ListEntry,
        values: &BTreeMap<String, String>,
    ) -> Result<ListEntry>;

    /// Deletes a row.
    async fn delete_row(&self, entry: &ListEntry) -> Result<()>;

    /// Writes one cell, creating it if it does not exist.
    async fn update_cell(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        row: u32,
        col: u32,
        value: &str,
    ) -> Result<CellEntry>;

    /// Submits a batch of cell updates to a cells feed batch link.
    async fn execute_batch(&self, batch: &CellBatch, batch_link: &str) -> Result<BatchOutcome>;
}
