//! Entries returned by the spreadsheet feeds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Returns the key encoded in a feed entry id.
///
/// Entry ids are URLs; the key is the last `/`-separated segment.
///
/// # Examples
///
/// ```
/// use sheetfeed_core::types::key_from_id;
///
/// assert_eq!(
///     key_from_id("https://spreadsheets.google.com/feeds/spreadsheets/private/full/0AbC"),
///     "0AbC"
/// );
/// assert_eq!(key_from_id("od6"), "od6");
/// ```
pub fn key_from_id(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

/// A spreadsheet visible to the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetEntry {
    /// Full entry id URL
    pub id: String,
    /// Spreadsheet title
    pub title: String,
}

impl SpreadsheetEntry {
    /// Returns the spreadsheet key.
    pub fn key(&self) -> &str {
        key_from_id(&self.id)
    }
}

/// A worksheet (tab) inside a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetEntry {
    /// Full entry id URL
    pub id: String,
    /// Worksheet title
    pub title: String,
    /// Number of rows the worksheet is sized to
    pub row_count: u32,
    /// Number of columns the worksheet is sized to
    pub col_count: u32,
}

impl WorksheetEntry {
    /// Returns the worksheet key.
    pub fn key(&self) -> &str {
        key_from_id(&self.id)
    }
}

/// A single non-empty cell from the cells feed.
///
/// Rows and columns are 1-based. Empty cells are never present in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellEntry {
    /// Full entry id URL
    pub id: String,
    /// URL used to modify this cell
    pub edit_link: String,
    /// 1-based row
    pub row: u32,
    /// 1-based column
    pub col: u32,
    /// Value as entered (formulas unevaluated)
    pub input_value: String,
    /// Displayed value
    pub content: String,
}

impl CellEntry {
    /// Returns `(row, col)`.
    pub fn position(&self) -> (u32, u32) {
        (self.row, self.col)
    }
}

/// The cells feed of a worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellsFeed {
    /// Non-empty cells, in feed order
    pub entries: Vec<CellEntry>,
    /// Link accepting batch cell updates
    pub batch_link: String,
}

/// A row from the list feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    /// Full entry id URL
    pub id: String,
    /// URL used to modify or delete this row
    pub edit_link: String,
    /// Column name to cell text, names derived from the header row
    pub values: BTreeMap<String, String>,
}

impl ListEntry {
    /// Returns the row id (last segment of the entry id).
    pub fn row_id(&self) -> &str {
        key_from_id(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_id_url() {
        assert_eq!(
            key_from_id("https://spreadsheets.google.com/feeds/worksheets/abc/private/full/od6"),
            "od6"
        );
    }

    #[test]
    fn test_key_from_id_trailing_slash() {
        assert_eq!(key_from_id("https://host/feeds/"), "");
    }

    #[test]
    fn test_list_entry_row_id() {
        let entry = ListEntry {
            id: "https://host/feeds/list/k/od6/private/full/cokwr".to_string(),
            edit_link: String::new(),
            values: BTreeMap::new(),
        };
        assert_eq!(entry.row_id(), "cokwr");
    }

    #[test]
    fn test_spreadsheet_and_worksheet_keys() {
        let sheet = SpreadsheetEntry {
            id: "https://host/feeds/spreadsheets/private/full/0AbC".to_string(),
            title: "Budget".to_string(),
        };
        let ws = WorksheetEntry {
            id: "https://host/feeds/worksheets/0AbC/private/full/od6".to_string(),
            title: "Sheet1".to_string(),
            row_count: 100,
            col_count: 20,
        };
        assert_eq!(sheet.key(), "0AbC");
        assert_eq!(ws.key(), "od6");
    }
}
