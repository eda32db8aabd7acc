//! Command-line arguments.

use clap::{Parser, Subcommand};

/// Sheetfeed: read and write spreadsheet rows and cells
#[derive(Parser, Debug)]
#[command(name = "sheetfeed", author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SHEETFEED_CONFIG")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List spreadsheets as `title<TAB>key`
    Spreadsheets,

    /// List worksheets of a spreadsheet as `title<TAB>key`
    Worksheets {
        /// Spreadsheet key
        spreadsheet: String,
    },

    /// Print rows as JSON lines
    Rows {
        /// Spreadsheet key
        spreadsheet: String,
        /// Worksheet key
        worksheet: String,
        /// Structured query, e.g. `name==Ada`
        #[arg(short, long)]
        query: Option<String>,
        /// Ordering, e.g. `column:age`
        #[arg(short, long)]
        order_by: Option<String>,
        /// Descending order
        #[arg(short, long)]
        reverse: bool,
    },

    /// Append a row from `column=value` pairs
    Insert {
        /// Spreadsheet key
        spreadsheet: String,
        /// Worksheet key
        worksheet: String,
        /// Column values
        #[arg(required = true, value_name = "COLUMN=VALUE")]
        values: Vec<String>,
    },

    /// Delete a row by id
    Delete {
        /// Spreadsheet key
        spreadsheet: String,
        /// Worksheet key
        worksheet: String,
        /// Row id
        row_id: String,
    },

    /// Write one cell
    SetCell {
        /// Spreadsheet key
        spreadsheet: String,
        /// Worksheet key
        worksheet: String,
        /// 1-based row
        row: u32,
        /// 1-based column
        col: u32,
        /// New value
        value: String,
    },

    /// Configuration file management
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print a value by dotted key
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Write a default config file
    Init {
        /// Target file instead of the default location
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
