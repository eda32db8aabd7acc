//! Batched cell updates.

use crate::types::feed::CellEntry;
use serde::{Deserialize, Serialize};

/// An ordered set of cell updates submitted in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellBatch {
    updates: Vec<CellEntry>,
}

impl CellBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a cell whose `input_value` holds the new value.
    pub fn add_update(&mut self, cell: CellEntry) {
        self.updates.push(cell);
    }

    /// Queued updates, in submission order.
    pub fn updates(&self) -> &[CellEntry] {
        &self.updates
    }

    /// Number of queued updates.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Drops every queued update.
    pub fn clear(&mut self) {
        self.updates.clear();
    }
}

/// Status of one entry in an executed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntryStatus {
    /// Cell entry id
    pub id: String,
    /// HTTP-style status code reported for this entry
    pub code: u16,
    /// Reason text reported by the service
    pub reason: String,
}

impl BatchEntryStatus {
    /// Whether this entry was applied.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Result of executing a [`CellBatch`].
///
/// Batches are best-effort: some entries may fail while others apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// One status per submitted entry
    pub statuses: Vec<BatchEntryStatus>,
}

impl BatchOutcome {
    /// Number of applied entries.
    pub fn succeeded(&self) -> usize {
        self.statuses.iter().filter(|s| s.is_success()).count()
    }

    /// Entries the service rejected.
    pub fn failures(&self) -> impl Iterator<Item = &BatchEntryStatus> {
        self.statuses.iter().filter(|s| !s.is_success())
    }
}

/// How a planned write reaches the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// Cell exists: queue it in the batch
    Batch,
    /// Cell does not exist yet: write it immediately
    Direct,
}

/// One cell write produced by [`plan_range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    /// 1-based row
    pub row: u32,
    /// 1-based column
    pub col: u32,
    /// New value; empty for blanked cells
    pub value: String,
    /// Delivery route
    pub kind: WriteKind,
}

/// Plans writes for the rectangle `start..=end` (inclusive, `(row, col)`).
///
/// `data[0][0]` lands on `start`. Values outside the rectangle are ignored.
/// Positions not covered by `data` are blanked when a cell exists there and
/// skipped otherwise. `exists` reports whether the cells feed has a cell at
/// a position.
pub fn plan_range<F>(
    start: (u32, u32),
    end: (u32, u32),
    data: &[Vec<String>],
    exists: F,
) -> Vec<PlannedWrite>
where
    F: Fn(u32, u32) -> bool,
{
    let mut writes = Vec::new();
    for row in start.0..=end.0 {
        for col in start.1..=end.1 {
            let value = data
                .get((row - start.0) as usize)
                .and_then(|r| r.get((col - start.1) as usize));
            let present = exists(row, col);
            match (value, present) {
                (Some(v), true) => writes.push(PlannedWrite {
                    row,
                    col,
                    value: v.clone(),
                    kind: WriteKind::Batch,
                }),
                (Some(v), false) => writes.push(PlannedWrite {
                    row,
                    col,
                    value: v.clone(),
                    kind: WriteKind::Direct,
                }),
                (None, true) => writes.push(PlannedWrite {
                    row,
                    col,
                    value: String::new(),
                    kind: WriteKind::Batch,
                }),
                (None, false) => {}
            }
        }
    }
    writes
}
