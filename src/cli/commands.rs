//! Command dispatch
//!
//! Opens the configured store, builds the engine and runs one subcommand.
//! Reports go to the supplied writer; progress goes to the log.

use crate::cli::args::{CliArgs, Command, ReportKind};
use crate::core::{reports, AggregationEngine};
use crate::ingest::{ingest, IngestConfig, IngestSummary};
use crate::io::csv_format::{
    parse_timestamp, write_balances_csv, write_recent_activity_csv, write_transfers_csv,
};
use crate::io::{MockTransactionGenerator, SyncReader};
use crate::store::SqliteStore;
use crate::types::{AccountId, AggregationError};
use chrono::{Local, NaiveDate};
use std::io::Write;
use std::time::Duration;

/// Run the command described by `args`, writing any report to `output`
///
/// # Errors
///
/// Returns configuration errors for malformed options, and any fatal store
/// or I/O error raised while running the command.
pub fn run(args: &CliArgs, output: &mut dyn Write) -> Result<(), AggregationError> {
    let store = SqliteStore::open(
        &args.database,
        Duration::from_millis(args.busy_timeout_ms),
    )?;
    let mut engine = AggregationEngine::with_window_size(store, args.window_size)?;

    match &args.command {
        Command::Ingest {
            input_file,
            max_retries,
        } => {
            let reader = SyncReader::new(input_file)?;
            let summary = ingest(&mut engine, reader, &IngestConfig::new(*max_retries))?;
            log_summary(&summary);
        }
        Command::Simulate { count, seed, start } => {
            let start = match start {
                Some(value) => {
                    parse_timestamp(value).map_err(AggregationError::invalid_config)?
                }
                None => Local::now().naive_local(),
            };
            let generator = MockTransactionGenerator::new(*seed, start, *count);
            let summary = ingest(&mut engine, generator, &IngestConfig::default())?;
            log_summary(&summary);
        }
        Command::Report {
            kind,
            date,
            account,
        } => {
            let date = date.as_deref().map(parse_date).transpose()?;
            report(engine.store(), *kind, date, *account, output)?;
        }
    }

    Ok(())
}

fn log_summary(summary: &IngestSummary) {
    log::info!(
        "Ingest finished: {} processed, {} failed, {} rejected",
        summary.processed,
        summary.failed,
        summary.rejected
    );
}

fn parse_date(value: &str) -> Result<NaiveDate, AggregationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AggregationError::invalid_config(format!("Invalid date '{}'", value)))
}

fn report(
    store: &SqliteStore,
    kind: ReportKind,
    date: Option<NaiveDate>,
    account: Option<AccountId>,
    output: &mut dyn Write,
) -> Result<(), AggregationError> {
    match kind {
        ReportKind::Transfers => {
            write_transfers_csv(&reports::daily_group_transfers(store, date)?, output)
        }
        ReportKind::Balances => write_balances_csv(&reports::group_balances(store, date)?, output),
        ReportKind::Recent => {
            let account = account.ok_or_else(|| {
                AggregationError::invalid_config("report recent requires --account")
            })?;
            if date.is_some() {
                return Err(AggregationError::invalid_config(
                    "--date does not apply to report recent",
                ));
            }
            write_recent_activity_csv(&reports::recent_activity(store, account)?, output)
        }
    }
}
