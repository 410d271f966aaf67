//! Read-side views over the aggregate tables
//!
//! Typed reads used by the `report` command and by tests. Nothing here
//! writes.

use crate::core::traits::DataStore;
use crate::store::Row;
use crate::types::{
    AccountId, AggregationError, DailyGroupTransfer, Direction, GroupDailyBalance, GroupId,
    RecentActivityEntry,
};
use chrono::NaiveDate;

const SELECT_TRANSFER: &str = "\
    SELECT origin_group_id, destination_group_id, date, sum_transfers, num_transfers \
    FROM daily_group_transfer \
    WHERE origin_group_id = ?1 AND destination_group_id = ?2 AND date = ?3";

const SELECT_TRANSFERS: &str = "\
    SELECT origin_group_id, destination_group_id, date, sum_transfers, num_transfers \
    FROM daily_group_transfer \
    WHERE ?1 IS NULL OR date = ?1 \
    ORDER BY date, origin_group_id, destination_group_id";

const SELECT_BALANCE: &str = "\
    SELECT account_group_id, date, amount FROM total_by_group \
    WHERE account_group_id = ?1 AND date = ?2";

const SELECT_BALANCE_AS_OF: &str = "\
    SELECT account_group_id, date, amount FROM total_by_group \
    WHERE account_group_id = ?1 AND date <= ?2 \
    ORDER BY date DESC LIMIT 1";

const SELECT_BALANCES: &str = "\
    SELECT account_group_id, date, amount FROM total_by_group \
    WHERE ?1 IS NULL OR date = ?1 \
    ORDER BY date, account_group_id";

const SELECT_RECENT: &str = "\
    SELECT account, transaction_id, other_account, amount, is_sender, timestamp \
    FROM recent_transactions \
    WHERE account = ?1 \
    ORDER BY timestamp, seq";

fn to_transfer(row: &Row) -> Result<DailyGroupTransfer, AggregationError> {
    Ok(DailyGroupTransfer {
        origin_group: row.get_i64("origin_group_id")?,
        destination_group: row.get_i64("destination_group_id")?,
        date: row.get_date("date")?,
        sum: row.get_units("sum_transfers")?,
        count: row.get_i64("num_transfers")?,
    })
}

fn to_balance(row: &Row) -> Result<GroupDailyBalance, AggregationError> {
    Ok(GroupDailyBalance {
        group: row.get_i64("account_group_id")?,
        date: row.get_date("date")?,
        amount: row.get_units("amount")?,
    })
}

fn to_entry(row: &Row) -> Result<RecentActivityEntry, AggregationError> {
    Ok(RecentActivityEntry {
        account: row.get_i64("account")?,
        transaction_id: row.get_i64("transaction_id")?,
        counterparty: row.get_i64("other_account")?,
        amount: row.get_units("amount")?,
        direction: Direction::from_is_sender(row.get_bool("is_sender")?),
        timestamp: row.get_datetime("timestamp")?,
    })
}

/// The directed transfer row for (origin, destination, date), if any
pub fn daily_group_transfer<S: DataStore + ?Sized>(
    store: &S,
    origin: GroupId,
    destination: GroupId,
    date: NaiveDate,
) -> Result<Option<DailyGroupTransfer>, AggregationError> {
    store
        .execute_query(
            SELECT_TRANSFER,
            &[origin.into(), destination.into(), date.into()],
        )?
        .first()
        .map(to_transfer)
        .transpose()
}

/// All directed transfer rows, optionally restricted to one date
pub fn daily_group_transfers<S: DataStore + ?Sized>(
    store: &S,
    date: Option<NaiveDate>,
) -> Result<Vec<DailyGroupTransfer>, AggregationError> {
    store
        .execute_query(SELECT_TRANSFERS, &[date.into()])?
        .iter()
        .map(to_transfer)
        .collect()
}

/// The balance row for exactly (group, date), if any
pub fn group_balance<S: DataStore + ?Sized>(
    store: &S,
    group: GroupId,
    date: NaiveDate,
) -> Result<Option<GroupDailyBalance>, AggregationError> {
    store
        .execute_query(SELECT_BALANCE, &[group.into(), date.into()])?
        .first()
        .map(to_balance)
        .transpose()
}

/// The most recent balance row for `group` on or before `date`
///
/// Days without activity have no row; their balance is the last one before.
pub fn group_balance_as_of<S: DataStore + ?Sized>(
    store: &S,
    group: GroupId,
    date: NaiveDate,
) -> Result<Option<GroupDailyBalance>, AggregationError> {
    store
        .execute_query(SELECT_BALANCE_AS_OF, &[group.into(), date.into()])?
        .first()
        .map(to_balance)
        .transpose()
}

/// All balance rows, optionally restricted to one date
pub fn group_balances<S: DataStore + ?Sized>(
    store: &S,
    date: Option<NaiveDate>,
) -> Result<Vec<GroupDailyBalance>, AggregationError> {
    store
        .execute_query(SELECT_BALANCES, &[date.into()])?
        .iter()
        .map(to_balance)
        .collect()
}

/// An account's recent-activity window, oldest entry first
pub fn recent_activity<S: DataStore + ?Sized>(
    store: &S,
    account: AccountId,
) -> Result<Vec<RecentActivityEntry>, AggregationError> {
    store
        .execute_query(SELECT_RECENT, &[account.into()])?
        .iter()
        .map(to_entry)
        .collect()
}
