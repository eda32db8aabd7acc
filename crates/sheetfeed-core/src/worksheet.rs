//! Worksheet wrapper: cell lookup, batched cell writes, and cached row access.
//!
//! A [`Worksheet`] snapshots the cells feed when it is opened and keeps the
//! list feed entries of the last row query in memory. The row cache is only
//! invalidated explicitly ([`Worksheet::flush_cache`]), when the query
//! changes, or after [`Worksheet::delete_all_rows`]; single-row writes patch
//! the cache in place.

use crate::client::FeedClient;
use crate::types::{
    BatchOutcome, CellBatch, CellEntry, CellsFeed, ID_FIELD, ListEntry, ListQuery, Row, RowQuery,
    WriteKind, column_key, plan_range,
};
use crate::{Error, Result};
use std::sync::Arc;

/// A single worksheet of a spreadsheet.
pub struct Worksheet {
    client: Arc<dyn FeedClient>,
    spreadsheet_key: String,
    worksheet_key: String,
    cells: CellsFeed,
    header_row: Vec<String>,
    batch: CellBatch,
    entries: Option<Vec<ListEntry>>,
    query: Option<ListQuery>,
}

impl std::fmt::Debug for Worksheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worksheet")
            .field("spreadsheet_key", &self.spreadsheet_key)
            .field("worksheet_key", &self.worksheet_key)
            .field("header_row", &self.header_row)
            .field("cells", &self.cells.entries.len())
            .field("cached_rows", &self.entries.as_ref().map(Vec::len))
            .field("query", &self.query)
            .finish()
    }
}

impl Worksheet {
    /// Opens a worksheet, fetching its cells feed and header row.
    pub async fn open(
        client: Arc<dyn FeedClient>,
        spreadsheet_key: impl Into<String>,
        worksheet_key: impl Into<String>,
    ) -> Result<Self> {
        let spreadsheet_key = spreadsheet_key.into();
        let worksheet_key = worksheet_key.into();
        let cells = client.cells_feed(&spreadsheet_key, &worksheet_key).await?;
        let mut worksheet = Self {
            client,
            spreadsheet_key,
            worksheet_key,
            cells,
            header_row: Vec::new(),
            batch: CellBatch::new(),
            entries: None,
            query: None,
        };
        worksheet.header_row = worksheet.read_header_row();

        tracing::debug!(
            spreadsheet = %worksheet.spreadsheet_key,
            worksheet = %worksheet.worksheet_key,
            cells = worksheet.cells.entries.len(),
            columns = worksheet.header_row.len(),
            "Opened worksheet"
        );
        Ok(worksheet)
    }

    /// The spreadsheet key.
    pub fn spreadsheet_key(&self) -> &str {
        &self.spreadsheet_key
    }

    /// The worksheet key.
    pub fn worksheet_key(&self) -> &str {
        &self.worksheet_key
    }

    /// Header texts of row 1, up to the first empty column.
    pub fn header_row(&self) -> &[String] {
        &self.header_row
    }

    /// The cached cells feed.
    pub fn cells(&self) -> &CellsFeed {
        &self.cells
    }

    /// Updates not yet submitted.
    pub fn pending_batch(&self) -> &CellBatch {
        &self.batch
    }

    /// Re-fetches the cells feed and recomputes the header row.
    pub async fn refresh_cells(&mut self) -> Result<()> {
        self.cells = self
            .client
            .cells_feed(&self.spreadsheet_key, &self.worksheet_key)
            .await?;
        self.header_row = self.read_header_row();
        Ok(())
    }

    fn read_header_row(&self) -> Vec<String> {
        let mut header = Vec::new();
        let mut col = 1;
        while let Some(cell) = self.find_cell(1, col) {
            header.push(cell.content.clone());
            col += 1;
        }
        header
    }

    // ------------------------------------------------------------------------
    // Cells
    // ------------------------------------------------------------------------

    fn cell_index(&self, row: u32, col: u32) -> Option<usize> {
        self.cells
            .entries
            .iter()
            .position(|c| c.row == row && c.col == col)
    }

    /// Finds the cached cell at `(row, col)`.
    pub fn find_cell(&self, row: u32, col: u32) -> Option<&CellEntry> {
        self.cell_index(row, col).map(|i| &self.cells.entries[i])
    }

    /// Finds the first cached cell whose displayed content equals `text`.
    pub fn find_cell_by_contents(&self, text: &str) -> Option<&CellEntry> {
        self.cells.entries.iter().find(|c| c.content == text)
    }

    /// Finds the next cell to the right in the same row.
    ///
    /// Empty cells do not exist in the feed, so this returns `None` at the
    /// first gap.
    pub fn next_cell(&self, cell: &CellEntry) -> Option<&CellEntry> {
        self.find_cell(cell.row, cell.col + 1)
    }

    /// Writes one cell immediately, creating it if needed.
    pub async fn update_cell(&mut self, row: u32, col: u32, value: &str) -> Result<CellEntry> {
        let cell = self
            .client
            .update_cell(&self.spreadsheet_key, &self.worksheet_key, row, col, value)
            .await?;
        match self.cell_index(row, col) {
            Some(i) => self.cells.entries[i] = cell.clone(),
            None => self.cells.entries.push(cell.clone()),
        }
        Ok(cell)
    }

    /// Sets a cached cell's value and queues it for the next batch.
    fn queue_update(&mut self, index: usize, value: &str) {
        let cell = &mut self.cells.entries[index];
        cell.input_value = value.to_string();
        cell.content = value.to_string();
        self.batch.add_update(cell.clone());
    }

    /// Empties the queue and puts the queued cells back to their state in
    /// `snapshot`.
    fn discard_batch(&mut self, snapshot: &[CellEntry]) {
        let batch = std::mem::take(&mut self.batch);
        for queued in batch.updates() {
            let Some(index) = self.cell_index(queued.row, queued.col) else {
                continue;
            };
            if let Some(original) = snapshot.iter().find(|c| c.position() == queued.position()) {
                self.cells.entries[index] = original.clone();
            }
        }
        if !batch.is_empty() {
            tracing::debug!(discarded = batch.len(), "Discarded cell batch");
        }
    }

    /// Submits queued updates and empties the queue.
    ///
    /// If the request fails, queued cells are restored from `snapshot`.
    async fn flush_batch(&mut self, snapshot: &[CellEntry]) -> Result<BatchOutcome> {
        if self.batch.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let result = self
            .client
            .execute_batch(&self.batch, &self.cells.batch_link)
            .await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.discard_batch(snapshot);
                return Err(e);
            }
        };
        let submitted = std::mem::take(&mut self.batch).len();

        for failure in outcome.failures() {
            tracing::warn!(
                cell = %failure.id,
                code = failure.code,
                reason = %failure.reason,
                "Batch cell update rejected"
            );
        }
        tracing::debug!(
            submitted,
            succeeded = outcome.succeeded(),
            "Executed cell batch"
        );
        Ok(outcome)
    }

    /// Writes a block of values into the rectangle `start..=end`.
    ///
    /// `start` and `end` are inclusive `(row, col)` pairs. Data always starts
    /// at `start`; values outside the rectangle are ignored. Positions in the
    /// rectangle not covered by `data` are blanked if a cell exists there and
    /// left alone otherwise. Existing cells are sent as one batch; cells
    /// that do not exist yet are written one at a time.
    ///
    /// On error nothing stays queued and the cached values of cells that
    /// were not sent are restored. Cells already written one at a time keep
    /// their new values.
    pub async fn batch(
        &mut self,
        start: (u32, u32),
        end: (u32, u32),
        data: &[Vec<String>],
    ) -> Result<BatchOutcome> {
        let snapshot = self.cells.entries.clone();
        if let Err(e) = self.queue_range(start, end, data).await {
            self.discard_batch(&snapshot);
            return Err(e);
        }
        self.flush_batch(&snapshot).await
    }

    async fn queue_range(
        &mut self,
        start: (u32, u32),
        end: (u32, u32),
        data: &[Vec<String>],
    ) -> Result<()> {
        let plan = plan_range(start, end, data, |r, c| self.cell_index(r, c).is_some());

        for write in plan {
            match write.kind {
                WriteKind::Batch => {
                    if let Some(index) = self.cell_index(write.row, write.col) {
                        self.queue_update(index, &write.value);
                    }
                }
                WriteKind::Direct => {
                    self.update_cell(write.row, write.col, &write.value).await?;
                }
            }
        }
        Ok(())
    }

    /// Upserts rows keyed on their first column.
    ///
    /// For each row, the first cell whose content equals the row's first
    /// value is looked up. If it sits in column 1, that cell and the cells
    /// to its right are overwritten (stopping at the first empty cell);
    /// otherwise the row is appended with [`Worksheet::insert_as_last`].
    /// Empty cells are never created by the update path.
    ///
    /// If a row fails, no update is sent and queued cells get their cached
    /// values back. Rows appended before the failure stay appended.
    pub async fn batch_verify_key_content(&mut self, data: &[Vec<String>]) -> Result<BatchOutcome> {
        let snapshot = self.cells.entries.clone();
        if let Err(e) = self.queue_keyed_rows(data).await {
            self.discard_batch(&snapshot);
            return Err(e);
        }
        self.flush_batch(&snapshot).await
    }

    async fn queue_keyed_rows(&mut self, data: &[Vec<String>]) -> Result<()> {
        for row in data {
            let Some(key) = row.first() else {
                continue;
            };

            let found = self
                .find_cell_by_contents(key)
                .filter(|c| c.col == 1)
                .map(CellEntry::position);

            match found {
                Some((r, first_col)) => {
                    let mut col = first_col;
                    for value in row {
                        let Some(index) = self.cell_index(r, col) else {
                            break;
                        };
                        self.queue_update(index, value);
                        col += 1;
                    }
                }
                None => {
                    self.insert_as_last(row).await?;
                }
            }
        }
        Ok(())
    }

    /// Appends a row given as a list of values in header order.
    ///
    /// Values are paired with the header row; extra values are ignored.
    pub async fn insert_as_last(&mut self, values: &[String]) -> Result<Row> {
        if values.len() < self.header_row.len() {
            return Err(Error::validation(format!(
                "Row has {} values but the header has {} columns",
                values.len(),
                self.header_row.len()
            )));
        }
        let row: Row = self
            .header_row
            .iter()
            .zip(values)
            .map(|(h, v)| (column_key(h), v.clone()))
            .collect();
        self.insert_row(&row).await
    }

    // ------------------------------------------------------------------------
    // Rows
    // ------------------------------------------------------------------------

    /// Drops cached row entries.
    pub fn flush_cache(&mut self) {
        self.entries = None;
    }

    /// Returns cached entries for the current query, fetching on a miss.
    ///
    /// An empty cache counts as a miss.
    async fn row_entries(&mut self) -> Result<&mut Vec<ListEntry>> {
        if self.entries.as_ref().is_none_or(Vec::is_empty) {
            let entries = self
                .client
                .list_feed(&self.spreadsheet_key, &self.worksheet_key, self.query.as_ref())
                .await?;
            tracing::debug!(
                worksheet = %self.worksheet_key,
                rows = entries.len(),
                query = ?self.query,
                "Fetched list feed"
            );
            self.entries = Some(entries);
        }
        Ok(self.entries.get_or_insert_with(Vec::new))
    }

    /// Finds a row entry by id, searching the cache before the service.
    async fn entry_by_id(&mut self, id: &str) -> Result<ListEntry> {
        let cached = self
            .row_entries()
            .await?
            .iter()
            .find(|e| e.row_id() == id)
            .cloned();
        if let Some(entry) = cached {
            return Ok(entry);
        }

        self.client
            .list_entry(&self.spreadsheet_key, &self.worksheet_key, id)
            .await?
            .ok_or_else(|| Error::RowNotFound { id: id.to_string() })
    }

    /// Returns the cached entry at `index`.
    async fn entry_at(&mut self, index: usize) -> Result<ListEntry> {
        let entries = self.row_entries().await?;
        entries
            .get(index)
            .cloned()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: entries.len(),
            })
    }

    fn replace_cached(&mut self, updated: &ListEntry) {
        if let Some(entries) = self.entries.as_mut() {
            for entry in entries.iter_mut().filter(|e| e.id == updated.id) {
                *entry = updated.clone();
            }
        }
    }

    fn require_id<'a>(row: &'a Row, action: &str) -> Result<&'a str> {
        row.id().ok_or_else(|| {
            Error::validation_field(
                ID_FIELD,
                format!("Row does not contain '{ID_FIELD}' field. Please {action} by index."),
            )
        })
    }

    /// Returns rows matching a query.
    ///
    /// A query different from the previous one flushes the row cache.
    pub async fn get_rows(&mut self, query: &RowQuery) -> Result<Vec<Row>> {
        let new_query = query.to_list_query();
        if self.query != new_query {
            self.flush_cache();
        }
        self.query = new_query;
        Ok(self.row_entries().await?.iter().map(Row::from_entry).collect())
    }

    /// Returns rows matching a query and an in-memory predicate.
    ///
    /// The query is evaluated by the service, the predicate locally.
    pub async fn get_rows_filtered<F>(&mut self, query: &RowQuery, predicate: F) -> Result<Vec<Row>>
    where
        F: Fn(&Row) -> bool,
    {
        let rows = self.get_rows(query).await?;
        Ok(rows.into_iter().filter(|r| predicate(r)).collect())
    }

    /// Updates the row identified by the row's [`ID_FIELD`].
    ///
    /// Only the supplied fields change. Returns the updated row.
    pub async fn update_row(&mut self, row: &Row) -> Result<Row> {
        let id = Self::require_id(row, "update")?;
        let entry = self.entry_by_id(id).await?;

        let mut merged = Row::from_entry(&entry);
        merged.merge(row);
        let updated = self.client.update_row(&entry, &merged.to_values()).await?;
        self.replace_cached(&updated);

        tracing::debug!(row = %updated.row_id(), "Updated row");
        Ok(Row::from_entry(&updated))
    }

    /// Updates the row at `index` of the current result set.
    ///
    /// The index is relative to the last query's results, not to the sheet.
    pub async fn update_row_by_index(&mut self, index: usize, row: &Row) -> Result<Row> {
        let entry = self.entry_at(index).await?;

        let mut merged = Row::from_entry(&entry);
        merged.merge(row);
        let updated = self.client.update_row(&entry, &merged.to_values()).await?;
        if let Some(slot) = self.entries.as_mut().and_then(|e| e.get_mut(index)) {
            *slot = updated.clone();
        }
        Ok(Row::from_entry(&updated))
    }

    /// Appends a row and returns it with its new id.
    pub async fn insert_row(&mut self, row: &Row) -> Result<Row> {
        let entry = self
            .client
            .insert_row(&self.spreadsheet_key, &self.worksheet_key, &row.to_values())
            .await?;
        if let Some(entries) = self.entries.as_mut().filter(|e| !e.is_empty()) {
            entries.push(entry.clone());
        }

        tracing::debug!(row = %entry.row_id(), "Inserted row");
        Ok(Row::from_entry(&entry))
    }

    /// Deletes the row identified by the row's [`ID_FIELD`].
    pub async fn delete_row(&mut self, row: &Row) -> Result<()> {
        let id = Self::require_id(row, "delete")?;
        let entry = self.entry_by_id(id).await?;
        self.client.delete_row(&entry).await?;
        if let Some(entries) = self.entries.as_mut() {
            entries.retain(|e| e.id != entry.id);
        }

        tracing::debug!(row = %id, "Deleted row");
        Ok(())
    }

    /// Deletes the row at `index` of the current result set.
    pub async fn delete_row_by_index(&mut self, index: usize) -> Result<()> {
        let entry = self.entry_at(index).await?;
        self.client.delete_row(&entry).await?;
        if let Some(entries) = self.entries.as_mut().filter(|e| index < e.len()) {
            entries.remove(index);
        }
        Ok(())
    }

    /// Deletes every row of the current result set.
    ///
    /// With `header_rows > 0` the first `header_rows` rows of the result set
    /// are kept and the rest are deleted from the bottom up. Flushes the row
    /// cache and returns the number of deleted rows. The cache is flushed
    /// even when a deletion fails.
    pub async fn delete_all_rows(&mut self, header_rows: usize) -> Result<usize> {
        let entries = self.row_entries().await?.clone();
        let result = self.delete_entries(&entries, header_rows).await;
        self.flush_cache();

        let deleted = result?;
        tracing::info!(worksheet = %self.worksheet_key, deleted, "Deleted rows");
        Ok(deleted)
    }

    async fn delete_entries(&mut self, entries: &[ListEntry], header_rows: usize) -> Result<usize> {
        let mut deleted = 0;
        if header_rows > 0 {
            for index in (header_rows..entries.len()).rev() {
                self.delete_row_by_index(index).await?;
                deleted += 1;
            }
        } else {
            for entry in entries {
                self.client.delete_row(entry).await?;
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}
