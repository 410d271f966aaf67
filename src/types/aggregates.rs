//! Derived aggregate records
//!
//! These mirror the three tables the engine maintains. The store owns them;
//! these structs are read-side snapshots only.

use super::transaction::{AccountId, Direction, GroupId, TransactionId};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Directed transfer total between two groups on one date
///
/// (A, B, d) and (B, A, d) are distinct rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyGroupTransfer {
    pub origin_group: GroupId,
    pub destination_group: GroupId,
    pub date: NaiveDate,

    /// Cumulative amount transferred
    pub sum: Decimal,

    /// Number of transfers accumulated
    pub count: i64,
}

/// Net balance of a group as of a date
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDailyBalance {
    pub group: GroupId,
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// One entry of an account's recent-activity window
#[derive(Debug, Clone, PartialEq)]
pub struct RecentActivityEntry {
    /// Account owning the window
    pub account: AccountId,

    /// Transaction the entry was recorded for
    pub transaction_id: TransactionId,

    /// The other party of the transaction
    pub counterparty: AccountId,

    pub amount: Decimal,
    pub direction: Direction,
    pub timestamp: NaiveDateTime,
}
