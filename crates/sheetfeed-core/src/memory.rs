//! In-memory feed client.
//!
//! [`MemoryFeedClient`] keeps spreadsheets as plain cell grids and serves
//! them through [`FeedClient`] the way the service does: row 1 is the
//! header, rows below it are list feed entries, and empty cells are absent
//! from the cells feed. Every call is recorded so callers can check how
//! often the service was hit.

use crate::client::FeedClient;
use crate::types::{
    BatchEntryStatus, BatchOutcome, CellBatch, CellEntry, CellsFeed, ListEntry, ListQuery,
    SpreadsheetEntry, WorksheetEntry, column_key,
};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Base URL used for ids and links of in-memory entries.
pub const MEMORY_FEEDS_URL: &str = "memory://feeds";

/// A call made against a [`MemoryFeedClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCall {
    /// `spreadsheets_feed`
    Spreadsheets,
    /// `worksheets_feed`
    Worksheets(String),
    /// `cells_feed`
    Cells(String),
    /// `list_feed`
    List(Option<ListQuery>),
    /// `list_entry`
    ListEntry(String),
    /// `insert_row`
    InsertRow,
    /// `update_row`
    UpdateRow(String),
    /// `delete_row`
    DeleteRow(String),
    /// `update_cell`
    UpdateCell(u32, u32),
    /// `execute_batch` with the number of queued updates
    Batch(usize),
}

#[derive(Debug, Default)]
struct MemWorksheet {
    key: String,
    title: String,
    cells: BTreeMap<(u32, u32), String>,
    row_ids: Vec<String>,
    next_row_id: u64,
    rejected: BTreeSet<(u32, u32)>,
    failing: BTreeSet<(u32, u32)>,
}

impl MemWorksheet {
    fn last_row(&self) -> u32 {
        self.cells.keys().map(|(r, _)| *r).max().unwrap_or(0)
    }

    fn last_col(&self) -> u32 {
        self.cells.keys().map(|(_, c)| *c).max().unwrap_or(0)
    }

    /// Keeps one row id per data row (rows 2..=last_row).
    fn sync_row_ids(&mut self) {
        let data_rows = self.last_row().saturating_sub(1) as usize;
        while self.row_ids.len() < data_rows {
            self.next_row_id += 1;
            self.row_ids.push(format!("r{}", self.next_row_id));
        }
        self.row_ids.truncate(data_rows);
    }

    fn header(&self) -> Vec<(u32, String)> {
        let mut header = Vec::new();
        let mut col = 1;
        while let Some(name) = self.cells.get(&(1, col)) {
            header.push((col, column_key(name)));
            col += 1;
        }
        header
    }

    fn set(&mut self, row: u32, col: u32, value: &str) {
        if value.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value.to_string());
        }
    }

    fn index_of(&self, row_id: &str) -> Option<usize> {
        self.row_ids.iter().position(|id| id == row_id)
    }

    fn write_row(&mut self, index: usize, values: &BTreeMap<String, String>) {
        let row = index as u32 + 2;
        for (col, name) in self.header() {
            let value = values.get(&name).map(String::as_str).unwrap_or("");
            self.set(row, col, value);
        }
    }

    fn remove_row(&mut self, index: usize) {
        let row = index as u32 + 2;
        self.cells = std::mem::take(&mut self.cells)
            .into_iter()
            .filter(|((r, _), _)| *r != row)
            .map(|((r, c), v)| if r > row { ((r - 1, c), v) } else { ((r, c), v) })
            .collect();
        self.row_ids.remove(index);
    }
}

#[derive(Debug, Default)]
struct MemSpreadsheet {
    key: String,
    title: String,
    worksheets: Vec<MemWorksheet>,
}

#[derive(Debug, Default)]
struct State {
    spreadsheets: Vec<MemSpreadsheet>,
    calls: Vec<FeedCall>,
}

impl State {
    fn worksheet(
        &mut self,
        spreadsheet_key: &str,
        worksheet_key: &str,
    ) -> Result<&mut MemWorksheet> {
        let sheet = self
            .spreadsheets
            .iter_mut()
            .find(|s| s.key == spreadsheet_key)
            .ok_or_else(|| {
                Error::service(404, format!("spreadsheet '{spreadsheet_key}' not found"))
            })?;
        let ws = sheet
            .worksheets
            .iter_mut()
            .find(|w| w.key == worksheet_key)
            .ok_or_else(|| {
                Error::service(404, format!("worksheet '{worksheet_key}' not found"))
            })?;
        ws.sync_row_ids();
        Ok(ws)
    }
}

/// Parses a query value, stripping optional double quotes.
fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Evaluates a single `column op value` structured query against a row.
///
/// Only equality and inequality are supported; ordering comparisons are
/// rejected rather than read as part of the column name.
fn matches_query(sq: &str, values: &BTreeMap<String, String>) -> Result<bool> {
    let unsupported = || {
        Error::validation_field("sq", format!("unsupported structured query '{sq}'"))
    };
    if let Some(start) = sq.find(['=', '!', '<', '>']) {
        let op = &sq[start..];
        if op.starts_with('>') || (op.starts_with('<') && !op.starts_with("<>")) {
            return Err(unsupported());
        }
    }
    for (op, negate) in [("==", false), ("!=", true), ("<>", true), ("=", false)] {
        if let Some((column, value)) = sq.split_once(op) {
            let actual = values
                .get(column.trim())
                .map(String::as_str)
                .unwrap_or("");
            return Ok((actual == unquote(value)) != negate);
        }
    }
    Err(unsupported())
}

/// An in-process [`FeedClient`].
#[derive(Debug, Default)]
pub struct MemoryFeedClient {
    state: Mutex<State>,
}

impl MemoryFeedClient {
    /// Creates a client with no spreadsheets.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an empty spreadsheet.
    pub fn add_spreadsheet(&self, key: &str, title: &str) {
        self.lock().spreadsheets.push(MemSpreadsheet {
            key: key.to_string(),
            title: title.to_string(),
            worksheets: Vec::new(),
        });
    }

    /// Adds a worksheet filled from `rows`, starting at cell (1, 1).
    ///
    /// The spreadsheet is created if it does not exist. Empty strings leave
    /// the cell absent.
    pub fn add_worksheet(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        title: &str,
        rows: &[&[&str]],
    ) {
        let mut state = self.lock();
        if !state.spreadsheets.iter().any(|s| s.key == spreadsheet_key) {
            state.spreadsheets.push(MemSpreadsheet {
                key: spreadsheet_key.to_string(),
                title: spreadsheet_key.to_string(),
                worksheets: Vec::new(),
            });
        }
        let mut ws = MemWorksheet {
            key: worksheet_key.to_string(),
            title: title.to_string(),
            ..MemWorksheet::default()
        };
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                ws.set(r as u32 + 1, c as u32 + 1, value);
            }
        }
        ws.sync_row_ids();
        if let Some(sheet) = state
            .spreadsheets
            .iter_mut()
            .find(|s| s.key == spreadsheet_key)
        {
            sheet.worksheets.push(ws);
        }
    }

    /// Makes batch updates at a position report failure.
    pub fn reject_batch_updates_at(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        row: u32,
        col: u32,
    ) {
        let mut state = self.lock();
        if let Ok(ws) = state.worksheet(spreadsheet_key, worksheet_key) {
            ws.rejected.insert((row, col));
        }
    }

    /// Makes every write touching a position fail with status 503.
    ///
    /// `update_cell` at the position errors, and so does a whole batch that
    /// contains it. Nothing is written by a failed call.
    pub fn fail_writes_at(&self, spreadsheet_key: &str, worksheet_key: &str, row: u32, col: u32) {
        let mut state = self.lock();
        if let Ok(ws) = state.worksheet(spreadsheet_key, worksheet_key) {
            ws.failing.insert((row, col));
        }
    }

    /// Returns the current value of a cell.
    pub fn cell(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        row: u32,
        col: u32,
    ) -> Option<String> {
        let mut state = self.lock();
        let ws = state.worksheet(spreadsheet_key, worksheet_key).ok()?;
        ws.cells.get(&(row, col)).cloned()
    }

    /// Returns every call made so far.
    pub fn calls(&self) -> Vec<FeedCall> {
        self.lock().calls.clone()
    }

    /// Counts calls matching a predicate.
    pub fn count_calls<F>(&self, pred: F) -> usize
    where
        F: Fn(&FeedCall) -> bool,
    {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn list_entry_at(spreadsheet_key: &str, ws: &MemWorksheet, index: usize) -> ListEntry {
        let row = index as u32 + 2;
        let id = format!(
            "{MEMORY_FEEDS_URL}/list/{spreadsheet_key}/{}/private/full/{}",
            ws.key, ws.row_ids[index]
        );
        let values = ws
            .header()
            .into_iter()
            .map(|(col, name)| {
                let value = ws.cells.get(&(row, col)).cloned().unwrap_or_default();
                (name, value)
            })
            .collect();
        ListEntry {
            edit_link: id.clone(),
            id,
            values,
        }
    }

    fn cell_entry(
        spreadsheet_key: &str,
        worksheet_key: &str,
        row: u32,
        col: u32,
        value: &str,
    ) -> CellEntry {
        let id = format!(
            "{MEMORY_FEEDS_URL}/cells/{spreadsheet_key}/{worksheet_key}/private/full/R{row}C{col}"
        );
        CellEntry {
            edit_link: id.clone(),
            id,
            row,
            col,
            input_value: value.to_string(),
            content: value.to_string(),
        }
    }

    /// Splits a list entry id into `(spreadsheet, worksheet, row_id)`.
    fn parse_list_id(id: &str) -> Result<(String, String, String)> {
        let rest = id
            .strip_prefix(MEMORY_FEEDS_URL)
            .and_then(|r| r.strip_prefix("/list/"))
            .ok_or_else(|| Error::malformed(format!("not an in-memory list entry: '{id}'")))?;
        let parts: Vec<&str> = rest.split('/').collect();
        match parts.as_slice() {
            [s, w, "private", "full", row] => {
                Ok((s.to_string(), w.to_string(), row.to_string()))
            }
            _ => Err(Error::malformed(format!("unexpected list entry id '{id}'"))),
        }
    }

    /// Splits a batch link into `(spreadsheet, worksheet)`.
    fn parse_batch_link(link: &str) -> Result<(String, String)> {
        let rest = link
            .strip_prefix(MEMORY_FEEDS_URL)
            .and_then(|r| r.strip_prefix("/cells/"))
            .ok_or_else(|| Error::malformed(format!("not an in-memory batch link: '{link}'")))?;
        let parts: Vec<&str> = rest.split('/').collect();
        match parts.as_slice() {
            [s, w, "private", "full", "batch"] => Ok((s.to_string(), w.to_string())),
            _ => Err(Error::malformed(format!("unexpected batch link '{link}'"))),
        }
    }
}

#[async_trait]
impl FeedClient for MemoryFeedClient {
    async fn spreadsheets_feed(&self) -> Result<Vec<SpreadsheetEntry>> {
        let mut state = self.lock();
        state.calls.push(FeedCall::Spreadsheets);
        Ok(state
            .spreadsheets
            .iter()
            .map(|s| SpreadsheetEntry {
                id: format!("{MEMORY_FEEDS_URL}/spreadsheets/private/full/{}", s.key),
                title: s.title.clone(),
            })
            .collect())
    }

    async fn worksheets_feed(&self, spreadsheet_key: &str) -> Result<Vec<WorksheetEntry>> {
        let mut state = self.lock();
        state
            .calls
            .push(FeedCall::Worksheets(spreadsheet_key.to_string()));
        let sheet = state
            .spreadsheets
            .iter()
            .find(|s| s.key == spreadsheet_key)
            .ok_or_else(|| {
                Error::service(404, format!("spreadsheet '{spreadsheet_key}' not found"))
            })?;
        Ok(sheet
            .worksheets
            .iter()
            .map(|w| WorksheetEntry {
                id: format!(
                    "{MEMORY_FEEDS_URL}/worksheets/{spreadsheet_key}/private/full/{}",
                    w.key
                ),
                title: w.title.clone(),
                row_count: w.last_row(),
                col_count: w.last_col(),
            })
            .collect())
    }

    async fn cells_feed(&self, spreadsheet_key: &str, worksheet_key: &str) -> Result<CellsFeed> {
        let mut state = self.lock();
        state.calls.push(FeedCall::Cells(worksheet_key.to_string()));
        let ws = state.worksheet(spreadsheet_key, worksheet_key)?;
        let entries = ws
            .cells
            .iter()
            .map(|((r, c), v)| Self::cell_entry(spreadsheet_key, worksheet_key, *r, *c, v))
            .collect();
        Ok(CellsFeed {
            entries,
            batch_link: format!(
                "{MEMORY_FEEDS_URL}/cells/{spreadsheet_key}/{worksheet_key}/private/full/batch"
            ),
        })
    }

    async fn list_feed(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        query: Option<&ListQuery>,
    ) -> Result<Vec<ListEntry>> {
        let mut state = self.lock();
        state.calls.push(FeedCall::List(query.cloned()));
        let ws = state.worksheet(spreadsheet_key, worksheet_key)?;
        let mut entries: Vec<ListEntry> = (0..ws.row_ids.len())
            .map(|i| Self::list_entry_at(spreadsheet_key, ws, i))
            .collect();

        if let Some(query) = query {
            if let Some(sq) = &query.sq {
                let mut kept = Vec::with_capacity(entries.len());
                for entry in entries {
                    if matches_query(sq, &entry.values)? {
                        kept.push(entry);
                    }
                }
                entries = kept;
            }
            if let Some(column) = query
                .order_by
                .as_deref()
                .and_then(|o| o.strip_prefix("column:"))
            {
                let column = column_key(column);
                entries.sort_by(|a, b| a.values.get(&column).cmp(&b.values.get(&column)));
            }
            if query.reverse {
                entries.reverse();
            }
        }
        Ok(entries)
    }

    async fn list_entry(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        row_id: &str,
    ) -> Result<Option<ListEntry>> {
        let mut state = self.lock();
        state.calls.push(FeedCall::ListEntry(row_id.to_string()));
        let ws = state.worksheet(spreadsheet_key, worksheet_key)?;
        Ok(ws
            .index_of(row_id)
            .map(|i| Self::list_entry_at(spreadsheet_key, ws, i)))
    }

    async fn insert_row(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        values: &BTreeMap<String, String>,
    ) -> Result<ListEntry> {
        let mut state = self.lock();
        state.calls.push(FeedCall::InsertRow);
        let ws = state.worksheet(spreadsheet_key, worksheet_key)?;
        if ws.header().is_empty() {
            return Err(Error::service(400, "worksheet has no header row"));
        }
        let index = ws.row_ids.len();
        ws.next_row_id += 1;
        let row_id = format!("r{}", ws.next_row_id);
        ws.row_ids.push(row_id);
        ws.write_row(index, values);
        Ok(Self::list_entry_at(spreadsheet_key, ws, index))
    }

    async fn update_row(
        &self,
        entry: &ListEntry,
        values: &BTreeMap<String, String>,
    ) -> Result<ListEntry> {
        let (spreadsheet_key, worksheet_key, row_id) = Self::parse_list_id(&entry.id)?;
        let mut state = self.lock();
        state.calls.push(FeedCall::UpdateRow(row_id.clone()));
        let ws = state.worksheet(&spreadsheet_key, &worksheet_key)?;
        let index = ws
            .index_of(&row_id)
            .ok_or_else(|| Error::service(404, format!("row '{row_id}' not found")))?;
        ws.write_row(index, values);
        Ok(Self::list_entry_at(&spreadsheet_key, ws, index))
    }

    async fn delete_row(&self, entry: &ListEntry) -> Result<()> {
        let (spreadsheet_key, worksheet_key, row_id) = Self::parse_list_id(&entry.id)?;
        let mut state = self.lock();
        state.calls.push(FeedCall::DeleteRow(row_id.clone()));
        let ws = state.worksheet(&spreadsheet_key, &worksheet_key)?;
        let index = ws
            .index_of(&row_id)
            .ok_or_else(|| Error::service(404, format!("row '{row_id}' not found")))?;
        ws.remove_row(index);
        Ok(())
    }

    async fn update_cell(
        &self,
        spreadsheet_key: &str,
        worksheet_key: &str,
        row: u32,
        col: u32,
        value: &str,
    ) -> Result<CellEntry> {
        let mut state = self.lock();
        state.calls.push(FeedCall::UpdateCell(row, col));
        let ws = state.worksheet(spreadsheet_key, worksheet_key)?;
        if ws.failing.contains(&(row, col)) {
            return Err(Error::service(503, format!("cell R{row}C{col} is unavailable")));
        }
        ws.set(row, col, value);
        ws.sync_row_ids();
        Ok(Self::cell_entry(spreadsheet_key, worksheet_key, row, col, value))
    }

    async fn execute_batch(&self, batch: &CellBatch, batch_link: &str) -> Result<BatchOutcome> {
        let (spreadsheet_key, worksheet_key) = Self::parse_batch_link(batch_link)?;
        let mut state = self.lock();
        state.calls.push(FeedCall::Batch(batch.len()));
        let ws = state.worksheet(&spreadsheet_key, &worksheet_key)?;
        if let Some(cell) = batch
            .updates()
            .iter()
            .find(|c| ws.failing.contains(&c.position()))
        {
            return Err(Error::service(
                503,
                format!("cell R{}C{} is unavailable", cell.row, cell.col),
            ));
        }
        let mut statuses = Vec::with_capacity(batch.len());
        for cell in batch.updates() {
            if ws.rejected.contains(&cell.position()) {
                statuses.push(BatchEntryStatus {
                    id: cell.id.clone(),
                    code: 403,
                    reason: "Forbidden".to_string(),
                });
                continue;
            }
            ws.set(cell.row, cell.col, &cell.input_value);
            statuses.push(BatchEntryStatus {
                id: cell.id.clone(),
                code: 200,
                reason: "Success".to_string(),
            });
        }
        ws.sync_row_ids();
        Ok(BatchOutcome { statuses })
    }
}
