//! # sheetfeed-client
//!
//! HTTP backend for Sheetfeed.
//!
//! [`HttpFeedClient`] implements [`sheetfeed_core::FeedClient`] against the
//! spreadsheet feeds service:
//! - reads request the `alt=json` rendering of each feed
//! - writes send Atom XML entries and parse the JSON reply
//! - cell batches are posted to the cells feed batch link

#![forbid(unsafe_code)]

mod atom;
pub mod client;
pub mod config;
pub mod error;
mod gdata;

pub use client::HttpFeedClient;
pub use config::{ClientConfig, DEFAULT_FEEDS_URL};
pub use error::{Error, Result};
