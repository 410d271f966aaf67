//! Ingest loop
//!
//! Drives any transaction source through an `AggregationEngine`, one
//! transaction at a time. Bad source rows and failed transactions are counted
//! and logged; processing continues unless the store itself is gone.

use crate::core::{AggregationEngine, DataStore};
use crate::types::{AggregationError, Transaction};

/// Ingest loop settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestConfig {
    /// Extra attempts for a transaction whose processing failed
    pub max_retries: u32,
}

impl IngestConfig {
    pub fn new(max_retries: u32) -> Self {
        IngestConfig { max_retries }
    }
}

/// Outcome counters for one ingest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Transactions committed
    pub processed: usize,
    /// Transactions that failed every attempt
    pub failed: usize,
    /// Source rows that never became a transaction
    pub rejected: usize,
}

/// Feed every item of `source` through `engine`
///
/// # Errors
///
/// Returns the first fatal error (`StoreUnavailable`). Everything that was
/// committed before it stays committed.
pub fn ingest<S, I>(
    engine: &mut AggregationEngine<S>,
    source: I,
    config: &IngestConfig,
) -> Result<IngestSummary, AggregationError>
where
    S: DataStore,
    I: IntoIterator<Item = Result<Transaction, String>>,
{
    let mut summary = IngestSummary::default();

    for item in source {
        let tx = match item {
            Ok(tx) => tx,
            Err(e) => {
                log::warn!("Rejected source row: {}", e);
                summary.rejected += 1;
                continue;
            }
        };

        match process_with_retries(engine, &tx, config.max_retries) {
            Ok(()) => summary.processed += 1,
            Err(e) if e.is_fatal() => {
                log::error!("Aborting ingest at transaction {}: {}", tx.id, e);
                return Err(e);
            }
            Err(e) => {
                log::warn!("Transaction {} not processed: {}", tx.id, e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

fn process_with_retries<S: DataStore>(
    engine: &mut AggregationEngine<S>,
    tx: &Transaction,
    max_retries: u32,
) -> Result<(), AggregationError> {
    let mut attempt = 0;
    loop {
        match engine.process_transaction(tx) {
            Ok(()) => return Ok(()),
            Err(e) if e.is_fatal() || attempt >= max_retries => return Err(e),
            Err(e) => {
                attempt += 1;
                log::debug!(
                    "Retrying transaction {} ({}/{}): {}",
                    tx.id,
                    attempt,
                    max_retries,
                    e
                );
            }
        }
    }
}
