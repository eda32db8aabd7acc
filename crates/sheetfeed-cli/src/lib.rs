//! # sheetfeed-cli
//!
//! Command-line interface for Sheetfeed:
//! - listing spreadsheets and worksheets
//! - printing, inserting and deleting rows
//! - writing single cells
//! - managing the TOML configuration file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;
pub mod error;

pub use error::{Error, Result};
