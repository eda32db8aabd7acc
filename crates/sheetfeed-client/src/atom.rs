//! Atom XML request bodies for feed writes.

use sheetfeed_core::types::CellEntry;
use sheetfeed_core::{Error, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;

const NS_ATOM: &str = "http://www.w3.org/2005/Atom";
const NS_GS: &str = "http://schemas.google.com/spreadsheets/2006";
const NS_GSX: &str = "http://schemas.google.com/spreadsheets/2006/extended";
const NS_BATCH: &str = "http://schemas.google.com/gdata/batch";

/// Content type of every write body.
pub(crate) const CONTENT_TYPE: &str = "application/atom+xml";

/// Escapes text for use in element content and attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// List feed column names become element names and must be plain.
fn check_column(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::validation_field(
            name.to_string(),
            format!("column name '{name}' must be non-empty lowercase letters and digits"),
        ));
    }
    Ok(())
}

/// Builds a list feed row entry. `id` is set when updating an existing row.
pub(crate) fn list_entry(id: Option<&str>, values: &BTreeMap<String, String>) -> Result<String> {
    let mut xml = format!(r#"<entry xmlns="{NS_ATOM}" xmlns:gsx="{NS_GSX}">"#);
    if let Some(id) = id {
        let _ = write!(xml, "<id>{}</id>", escape(id));
    }
    for (column, value) in values {
        check_column(column)?;
        let _ = write!(xml, "<gsx:{column}>{}</gsx:{column}>", escape(value));
    }
    xml.push_str("</entry>");
    Ok(xml)
}

fn cell_body(xml: &mut String, id: &str, edit_link: &str, row: u32, col: u32, value: &str) {
    let _ = write!(
        xml,
        r#"<id>{}</id><link rel="edit" type="{CONTENT_TYPE}" href="{}"/>"#,
        escape(id),
        escape(edit_link)
    );
    let _ = write!(
        xml,
        r#"<gs:cell row="{row}" col="{col}" inputValue="{}"/>"#,
        escape(value)
    );
}

/// Builds a single cell entry writing `value` at `(row, col)`.
pub(crate) fn cell_entry(cell_url: &str, row: u32, col: u32, value: &str) -> String {
    let mut xml = format!(r#"<entry xmlns="{NS_ATOM}" xmlns:gs="{NS_GS}">"#);
    cell_body(&mut xml, cell_url, cell_url, row, col, value);
    xml.push_str("</entry>");
    xml
}

/// Builds a batch feed of cell updates posted to `batch_link`.
///
/// Each entry carries a `batch:id` of the form `A{n}` so responses can be
/// matched when the service omits the cell id.
pub(crate) fn batch_feed(batch_link: &str, cells: &[CellEntry]) -> String {
    let feed_id = batch_link.strip_suffix("/batch").unwrap_or(batch_link);
    let mut xml = format!(
        r#"<feed xmlns="{NS_ATOM}" xmlns:batch="{NS_BATCH}" xmlns:gs="{NS_GS}"><id>{}</id>"#,
        escape(feed_id)
    );
    for (n, cell) in cells.iter().enumerate() {
        let _ = write!(
            xml,
            r#"<entry><batch:id>A{}</batch:id><batch:operation type="update"/>"#,
            n + 1
        );
        cell_body(
            &mut xml,
            &cell.id,
            &cell.edit_link,
            cell.row,
            cell.col,
            &cell.input_value,
        );
        xml.push_str("</entry>");
    }
    xml.push_str("</feed>");
    xml
}
