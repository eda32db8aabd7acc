//! Common test utilities for Sheetfeed integration tests.

use sheetfeed_core::memory::{FeedCall, MemoryFeedClient};
use sheetfeed_core::{SpreadsheetApi, Worksheet};
use std::sync::Arc;

/// Spreadsheet key used by the fixtures.
pub const BOOK: &str = "0Aq7Pb";

/// Worksheet key used by the fixtures.
pub const SHEET: &str = "od6";

/// Test harness bundling the in-memory service and an API over it.
pub struct TestHarness {
    /// In-memory service
    pub memory: Arc<MemoryFeedClient>,
    /// API wrapper sharing the same service
    pub api: SpreadsheetApi,
}

impl TestHarness {
    /// Creates a harness with one worksheet filled from `rows`.
    pub fn with_rows(rows: &[&[&str]]) -> Self {
        let memory = Arc::new(MemoryFeedClient::new());
        memory.add_spreadsheet(BOOK, "Contacts");
        memory.add_worksheet(BOOK, SHEET, "People", rows);
        let api = SpreadsheetApi::new(memory.clone());
        Self { memory, api }
    }

    /// Creates a harness with the standard people sheet.
    pub fn people() -> Self {
        Self::with_rows(PEOPLE)
    }

    /// Opens the fixture worksheet and clears recorded calls.
    pub async fn worksheet(&self) -> Worksheet {
        let ws = self
            .api
            .get_worksheet(BOOK, SHEET)
            .await
            .expect("fixture worksheet should open");
        self.memory.clear_calls();
        ws
    }

    /// Number of list feed fetches so far.
    pub fn list_fetches(&self) -> usize {
        self.memory
            .count_calls(|c| matches!(c, FeedCall::List(_)))
    }

    /// Current value of a cell in the fixture worksheet.
    pub fn cell(&self, row: u32, col: u32) -> Option<String> {
        self.memory.cell(BOOK, SHEET, row, col)
    }
}

/// Header plus three people.
pub const PEOPLE: &[&[&str]] = &[
    &["Name", "Email", "Age"],
    &["Ada", "ada@example.com", "36"],
    &["Grace", "grace@example.com", "85"],
    &["Alan", "alan@example.com", "41"],
];

/// Builds an owned grid from string slices.
pub fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}
