//! Parsing of the `alt=json` rendering of the feeds.
//!
//! Text nodes are objects with a `$t` member, namespaced elements use `$`
//! in place of `:` (`gs$cell`, `gsx$name`), and links are arrays of
//! `{rel, href}` objects.

use serde::Deserialize;
use sheetfeed_core::types::{
    BatchEntryStatus, CellEntry, CellsFeed, ListEntry, SpreadsheetEntry, WorksheetEntry,
};
use sheetfeed_core::{Error, Result};
use std::collections::BTreeMap;

/// Link relation of an entry's edit URL.
const REL_EDIT: &str = "edit";

/// Link relation of a feed's batch URL.
pub(crate) const REL_BATCH: &str = "http://schemas.google.com/g/2005#batch";

/// Prefix of list feed column elements.
const COLUMN_PREFIX: &str = "gsx$";

#[derive(Debug, Default, Deserialize)]
struct Text {
    #[serde(rename = "$t", default)]
    t: String,
}

#[derive(Debug, Deserialize)]
struct Link {
    rel: String,
    href: String,
}

#[derive(Debug, Deserialize)]
struct RawCell {
    row: String,
    col: String,
    #[serde(rename = "inputValue", default)]
    input_value: String,
    #[serde(rename = "$t", default)]
    t: String,
}

#[derive(Debug, Deserialize)]
struct RawBatchStatus {
    #[serde(deserialize_with = "status_code")]
    code: u16,
    #[serde(default)]
    reason: String,
}

/// Reads a batch status code given either as a number or as a numeric string.
fn status_code<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Number(u16),
        Text(String),
    }

    match Code::deserialize(deserializer)? {
        Code::Number(code) => Ok(code),
        Code::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid status code '{text}'"))),
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: Text,
    #[serde(default)]
    title: Option<Text>,
    #[serde(default)]
    link: Vec<Link>,
    #[serde(rename = "gs$cell", default)]
    cell: Option<RawCell>,
    #[serde(rename = "gs$rowCount", default)]
    row_count: Option<Text>,
    #[serde(rename = "gs$colCount", default)]
    col_count: Option<Text>,
    #[serde(rename = "batch$id", default)]
    batch_id: Option<Text>,
    #[serde(rename = "batch$status", default)]
    batch_status: Option<RawBatchStatus>,
    #[serde(flatten)]
    other: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFeed {
    #[serde(default)]
    entry: Vec<RawEntry>,
    #[serde(default)]
    link: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct FeedDocument {
    feed: RawFeed,
}

#[derive(Debug, Deserialize)]
struct EntryDocument {
    entry: RawEntry,
}

fn find_link<'a>(links: &'a [Link], rel: &str) -> Option<&'a str> {
    links
        .iter()
        .find(|l| l.rel == rel)
        .map(|l| l.href.as_str())
}

fn parse_count(text: Option<&Text>, what: &str) -> Result<u32> {
    match text {
        None => Ok(0),
        Some(t) => t
            .t
            .parse()
            .map_err(|_| Error::malformed(format!("{what} '{}' is not a number", t.t))),
    }
}

fn read_feed(body: &str) -> Result<RawFeed> {
    let doc: FeedDocument = serde_json::from_str(body)?;
    Ok(doc.feed)
}

fn read_entry(body: &str) -> Result<RawEntry> {
    let doc: EntryDocument = serde_json::from_str(body)?;
    Ok(doc.entry)
}

impl RawEntry {
    fn title(&self) -> String {
        self.title.as_ref().map(|t| t.t.clone()).unwrap_or_default()
    }

    fn into_spreadsheet(self) -> SpreadsheetEntry {
        let title = self.title();
        SpreadsheetEntry { id: self.id.t, title }
    }

    fn into_worksheet(self) -> Result<WorksheetEntry> {
        Ok(WorksheetEntry {
            title: self.title(),
            row_count: parse_count(self.row_count.as_ref(), "rowCount")?,
            col_count: parse_count(self.col_count.as_ref(), "colCount")?,
            id: self.id.t,
        })
    }

    fn into_cell(self) -> Result<CellEntry> {
        let cell = self
            .cell
            .ok_or_else(|| Error::malformed(format!("entry '{}' has no gs$cell", self.id.t)))?;
        let row = cell
            .row
            .parse()
            .map_err(|_| Error::malformed(format!("cell row '{}' is not a number", cell.row)))?;
        let col = cell
            .col
            .parse()
            .map_err(|_| Error::malformed(format!("cell col '{}' is not a number", cell.col)))?;
        // Cells feeds fetched read-only carry no edit link; the id addresses the cell too.
        let edit_link = find_link(&self.link, REL_EDIT).unwrap_or(&self.id.t).to_string();
        Ok(CellEntry {
            id: self.id.t,
            edit_link,
            row,
            col,
            input_value: cell.input_value,
            content: cell.t,
        })
    }

    fn into_list_entry(self) -> Result<ListEntry> {
        let edit_link = find_link(&self.link, REL_EDIT)
            .ok_or_else(|| Error::malformed(format!("row '{}' has no edit link", self.id.t)))?
            .to_string();
        let values = self
            .other
            .iter()
            .filter_map(|(key, value)| {
                let column = key.strip_prefix(COLUMN_PREFIX)?;
                let text = value.get("$t").and_then(|t| t.as_str()).unwrap_or_default();
                Some((column.to_string(), text.to_string()))
            })
            .collect();
        Ok(ListEntry {
            id: self.id.t,
            edit_link,
            values,
        })
    }

    fn into_batch_status(self) -> Result<BatchEntryStatus> {
        let status = self.batch_status.ok_or_else(|| {
            Error::malformed(format!("batch entry '{}' has no batch$status", self.id.t))
        })?;
        let id = if self.id.t.is_empty() {
            self.batch_id.map(|b| b.t).unwrap_or_default()
        } else {
            self.id.t
        };
        Ok(BatchEntryStatus {
            id,
            code: status.code,
            reason: status.reason,
        })
    }
}

/// Parses a spreadsheets feed.
pub(crate) fn spreadsheets(body: &str) -> Result<Vec<SpreadsheetEntry>> {
    Ok(read_feed(body)?
        .entry
        .into_iter()
        .map(RawEntry::into_spreadsheet)
        .collect())
}

/// Parses a worksheets feed.
pub(crate) fn worksheets(body: &str) -> Result<Vec<WorksheetEntry>> {
    read_feed(body)?
        .entry
        .into_iter()
        .map(RawEntry::into_worksheet)
        .collect()
}

/// Parses a cells feed together with its batch link.
pub(crate) fn cells(body: &str) -> Result<CellsFeed> {
    let feed = read_feed(body)?;
    let batch_link = find_link(&feed.link, REL_BATCH)
        .ok_or_else(|| Error::malformed("cells feed has no batch link"))?
        .to_string();
    let entries = feed
        .entry
        .into_iter()
        .map(RawEntry::into_cell)
        .collect::<Result<_>>()?;
    Ok(CellsFeed {
        entries,
        batch_link,
    })
}

/// Parses a single cell entry.
pub(crate) fn cell(body: &str) -> Result<CellEntry> {
    read_entry(body)?.into_cell()
}

/// Parses a list feed.
pub(crate) fn list(body: &str) -> Result<Vec<ListEntry>> {
    read_feed(body)?
        .entry
        .into_iter()
        .map(RawEntry::into_list_entry)
        .collect()
}

/// Parses a single list entry.
pub(crate) fn list_entry(body: &str) -> Result<ListEntry> {
    read_entry(body)?.into_list_entry()
}

/// Parses a batch response feed.
pub(crate) fn batch_statuses(body: &str) -> Result<Vec<BatchEntryStatus>> {
    read_feed(body)?
        .entry
        .into_iter()
        .map(RawEntry::into_batch_status)
        .collect()
}
