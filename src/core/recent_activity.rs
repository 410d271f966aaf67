//! Per-account recent-activity window
//!
//! Each account keeps at most `limit` entries in `recent_transactions`.
//! Entries are ordered by `(timestamp, seq)`; `seq` is the insertion counter
//! and breaks ties between equal timestamps. Eviction is driven purely by the
//! size bound and always removes the oldest entries first.

use crate::core::traits::DataStore;
use crate::types::{AccountId, AggregationError, Direction, TransactionId};
use chrono::NaiveDateTime;

/// Default number of entries kept per account
pub const RECENT_ACTIVITY_LIMIT: usize = 20;

const INSERT_ENTRY: &str = "\
    INSERT INTO recent_transactions \
        (account, transaction_id, other_account, amount, is_sender, timestamp) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const EVICT_BEYOND_LIMIT: &str = "\
    DELETE FROM recent_transactions \
    WHERE account = ?1 AND seq NOT IN ( \
        SELECT seq FROM recent_transactions \
        WHERE account = ?1 \
        ORDER BY timestamp DESC, seq DESC \
        LIMIT ?2)";

/// An entry about to be appended to one account's window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowEntry {
    pub account: AccountId,
    pub transaction_id: TransactionId,
    pub counterparty: AccountId,
    /// Amount in stored units
    pub units: i64,
    pub direction: Direction,
    pub timestamp: NaiveDateTime,
}

/// Append `entry` to its account's window and trim the window to `limit`
///
/// Returns the number of evicted entries. Touches only `entry.account`'s
/// window, so calling it for both parties of one transaction is safe.
pub fn record<S: DataStore + ?Sized>(
    store: &mut S,
    entry: &WindowEntry,
    limit: usize,
) -> Result<usize, AggregationError> {
    store.execute_update(
        INSERT_ENTRY,
        &[
            entry.account.into(),
            entry.transaction_id.into(),
            entry.counterparty.into(),
            entry.units.into(),
            entry.direction.is_sender().into(),
            entry.timestamp.into(),
        ],
    )?;

    let evicted = store.execute_update(EVICT_BEYOND_LIMIT, &[entry.account.into(), limit.into()])?;

    if evicted > 0 {
        log::debug!(
            "Evicted {} entries from account {} window",
            evicted,
            entry.account
        );
    }

    Ok(evicted)
}
