#![forbid(unsafe_code)]

//! Sheetfeed CLI
//!
//! Command-line access to spreadsheet rows and cells.

use anyhow::Result;
use clap::Parser;
use sheetfeed_cli::cli::{Args, Command};
use sheetfeed_cli::commands;
use sheetfeed_cli::config::SheetfeedConfig;
use sheetfeed_cli::config_handlers::handle_config_command;
use sheetfeed_core::RowQuery;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "info,sheetfeed_core=debug,sheetfeed_client=debug,sheetfeed_auth=debug,sheetfeed_cli=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = args.config.as_deref();
    let command = match args.command {
        Command::Config { action } => {
            handle_config_command(config_path, action)?;
            return Ok(());
        }
        command => command,
    };

    let config = SheetfeedConfig::load(config_path)?;
    let api = commands::connect(&config).await?;
    let mut out = std::io::stdout().lock();

    match command {
        Command::Spreadsheets => commands::spreadsheets(&api, &mut out).await?,
        Command::Worksheets { spreadsheet } => {
            commands::worksheets(&api, &spreadsheet, &mut out).await?
        }
        Command::Rows {
            spreadsheet,
            worksheet,
            query,
            order_by,
            reverse,
        } => {
            let query = RowQuery {
                query,
                order_by,
                reverse,
            };
            let count = commands::rows(&api, &spreadsheet, &worksheet, &query, &mut out).await?;
            tracing::debug!(count, "Printed rows");
        }
        Command::Insert {
            spreadsheet,
            worksheet,
            values,
        } => commands::insert(&api, &spreadsheet, &worksheet, &values, &mut out).await?,
        Command::Delete {
            spreadsheet,
            worksheet,
            row_id,
        } => commands::delete(&api, &spreadsheet, &worksheet, &row_id).await?,
        Command::SetCell {
            spreadsheet,
            worksheet,
            row,
            col,
            value,
        } => commands::set_cell(&api, &spreadsheet, &worksheet, (row, col), &value).await?,
        Command::Config { .. } => {}
    }

    Ok(())
}
