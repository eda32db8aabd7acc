//! Core types for the spreadsheet feeds.

mod batch;
mod feed;
mod proptests;
mod query;
mod row;

pub use batch::{BatchEntryStatus, BatchOutcome, CellBatch, PlannedWrite, WriteKind, plan_range};
pub use feed::{CellEntry, CellsFeed, ListEntry, SpreadsheetEntry, WorksheetEntry, key_from_id};
pub use query::{ListQuery, RowQuery};
pub use row::{ID_FIELD, Row, column_key};
