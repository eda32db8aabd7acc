#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Sheetfeed Core
//!
//! Convenience layer over the spreadsheet feeds API.
//!
//! - [`SpreadsheetApi`]: list spreadsheets and worksheets, open a worksheet
//! - [`Worksheet`]: cell lookup, batched cell writes, cached row CRUD
//! - [`FeedClient`]: the seam every service backend implements
//! - [`memory::MemoryFeedClient`]: in-process backend for tests and dry runs

pub mod api;
pub mod client;
pub mod error;
pub mod memory;
pub mod types;
pub mod worksheet;

// Re-exports for convenience
pub use api::SpreadsheetApi;
pub use client::FeedClient;
pub use error::{Error, Result};
pub use types::{ID_FIELD, Row, RowQuery};
pub use worksheet::Worksheet;
