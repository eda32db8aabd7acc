//! Spreadsheet command handlers.
//!
//! Handlers take the [`SpreadsheetApi`] and an output sink so they run the
//! same over HTTP and over the in-memory backend.

use crate::config::SheetfeedConfig;
use crate::error::{Error, Result};
use sheetfeed_auth::{TokenRefresher, authorize};
use sheetfeed_client::HttpFeedClient;
use sheetfeed_core::types::column_key;
use sheetfeed_core::{ID_FIELD, Row, RowQuery, SpreadsheetApi};
use std::io::Write;
use std::sync::Arc;

/// Authorizes with stored credentials and builds an HTTP-backed API.
pub async fn connect(config: &SheetfeedConfig) -> Result<SpreadsheetApi> {
    let credentials = authorize(&config.auth_config(), &TokenRefresher::new()).await?;
    let client = HttpFeedClient::new(config.client_config(), credentials.access_token)?;
    tracing::debug!(feeds_url = %config.feeds_url, "Connected");
    Ok(SpreadsheetApi::new(Arc::new(client)))
}

/// Splits a `column=value` argument; the column is normalized to a list key.
pub fn parse_assignment(arg: &str) -> Result<(String, String)> {
    let (column, value) = arg
        .split_once('=')
        .ok_or_else(|| Error::argument(format!("expected COLUMN=VALUE, got '{arg}'")))?;
    let key = column_key(column);
    if key.is_empty() {
        return Err(Error::argument(format!("column name missing in '{arg}'")));
    }
    Ok((key, value.to_string()))
}

fn write_pairs(out: &mut impl Write, pairs: &[(String, String)]) -> Result<()> {
    for (title, key) in pairs {
        writeln!(out, "{title}\t{key}")?;
    }
    Ok(())
}

/// `spreadsheets`
pub async fn spreadsheets(api: &SpreadsheetApi, out: &mut impl Write) -> Result<()> {
    write_pairs(out, &api.list_spreadsheets().await?)
}

/// `worksheets <spreadsheet>`
pub async fn worksheets(
    api: &SpreadsheetApi,
    spreadsheet: &str,
    out: &mut impl Write,
) -> Result<()> {
    write_pairs(out, &api.list_worksheets(spreadsheet).await?)
}

/// `rows <spreadsheet> <worksheet>`, one JSON object per line.
pub async fn rows(
    api: &SpreadsheetApi,
    spreadsheet: &str,
    worksheet: &str,
    query: &RowQuery,
    out: &mut impl Write,
) -> Result<usize> {
    let mut sheet = api.get_worksheet(spreadsheet, worksheet).await?;
    let rows = sheet.get_rows(query).await?;
    for row in &rows {
        writeln!(out, "{}", serde_json::to_string(row)?)?;
    }
    Ok(rows.len())
}

/// `insert <spreadsheet> <worksheet> COLUMN=VALUE...`
pub async fn insert(
    api: &SpreadsheetApi,
    spreadsheet: &str,
    worksheet: &str,
    assignments: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let row = assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Row>>()?;
    let mut sheet = api.get_worksheet(spreadsheet, worksheet).await?;
    let inserted = sheet.insert_row(&row).await?;
    writeln!(out, "{}", serde_json::to_string(&inserted)?)?;
    Ok(())
}

/// `delete <spreadsheet> <worksheet> <row-id>`
pub async fn delete(
    api: &SpreadsheetApi,
    spreadsheet: &str,
    worksheet: &str,
    row_id: &str,
) -> Result<()> {
    let mut sheet = api.get_worksheet(spreadsheet, worksheet).await?;
    sheet.delete_row(&Row::new().with(ID_FIELD, row_id)).await?;
    tracing::info!(row = %row_id, "Deleted row");
    Ok(())
}

/// `set-cell <spreadsheet> <worksheet> <row> <col> <value>`
pub async fn set_cell(
    api: &SpreadsheetApi,
    spreadsheet: &str,
    worksheet: &str,
    (row, col): (u32, u32),
    value: &str,
) -> Result<()> {
    if row == 0 || col == 0 {
        return Err(Error::argument("rows and columns are 1-based"));
    }
    let mut sheet = api.get_worksheet(spreadsheet, worksheet).await?;
    sheet.update_cell(row, col, value).await?;
    tracing::info!(row, col, "Updated cell");
    Ok(())
}
