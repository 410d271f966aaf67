//! Per-group daily balance accumulation
//!
//! Maintains `total_by_group`: one row per (group, date) holding the group's
//! net position as of that date.
//!
//! # Update protocol
//!
//! 1. Try `amount = amount + delta` on the exact (group, date) row.
//! 2. If no row was affected, seed a new row from the group's net transfers on
//!    earlier dates and insert `seed + delta`.
//! 3. If the insert hits the (group, date) uniqueness constraint, another
//!    writer seeded the row first; retry step 1 once.
//!
//! The delta is applied exactly once on every path: either by the update or
//! embedded in the seeded insert, never both.

use crate::core::traits::DataStore;
use crate::types::{AggregationError, GroupId};
use chrono::NaiveDate;

const ADD_TO_BALANCE: &str = "\
    UPDATE total_by_group SET amount = amount + ?1 \
    WHERE account_group_id = ?2 AND date = ?3";

const INSERT_BALANCE: &str = "\
    INSERT INTO total_by_group (account_group_id, date, amount) VALUES (?1, ?2, ?3)";

// Bounded to earlier dates: the current transaction's own transfer row is
// already written by this point and must not leak into the seed.
const NET_TRANSFERS_BEFORE: &str = "\
    SELECT \
        COALESCE((SELECT SUM(sum_transfers) FROM daily_group_transfer \
                  WHERE destination_group_id = ?1 AND date < ?2), 0) AS received, \
        COALESCE((SELECT SUM(sum_transfers) FROM daily_group_transfer \
                  WHERE origin_group_id = ?1 AND date < ?2), 0) AS sent";

/// Apply a signed balance change (in amount units) to (group, date)
pub fn apply_delta<S: DataStore + ?Sized>(
    store: &mut S,
    group: GroupId,
    date: NaiveDate,
    delta: i64,
) -> Result<(), AggregationError> {
    if add_to_existing(store, group, date, delta)? {
        return Ok(());
    }

    let seed = seed_balance(store, group, date)?;
    let amount = seed
        .checked_add(delta)
        .ok_or_else(|| AggregationError::arithmetic_overflow("seed balance", group))?;

    match store.execute_update(INSERT_BALANCE, &[group.into(), date.into(), amount.into()]) {
        Ok(_) => {
            log::debug!("Seeded balance for group {group} on {date} at {amount} units (seed {seed})");
            Ok(())
        }
        Err(AggregationError::ConstraintViolation { message }) => {
            log::warn!(
                "Balance row for group {group} on {date} was seeded concurrently ({message}); retrying as update"
            );
            if add_to_existing(store, group, date, delta)? {
                Ok(())
            } else {
                Err(AggregationError::query_failure(format!(
                    "balance row for group {group} on {date} vanished after a seeding conflict"
                )))
            }
        }
        Err(e) => Err(e),
    }
}

/// Step 1: in-place additive update; `true` if a row was affected
fn add_to_existing<S: DataStore + ?Sized>(
    store: &mut S,
    group: GroupId,
    date: NaiveDate,
    delta: i64,
) -> Result<bool, AggregationError> {
    let affected = store
        .execute_update(ADD_TO_BALANCE, &[delta.into(), group.into(), date.into()])
        .map_err(|e| e.for_group(group))?;
    Ok(affected > 0)
}

/// Net units received minus sent by `group` on dates strictly before `date`
///
/// Zero for a group with no history.
pub fn seed_balance<S: DataStore + ?Sized>(
    store: &S,
    group: GroupId,
    date: NaiveDate,
) -> Result<i64, AggregationError> {
    let rows = store
        .execute_query(NET_TRANSFERS_BEFORE, &[group.into(), date.into()])
        .map_err(|e| e.for_group(group))?;

    let row = rows.first().ok_or_else(|| {
        AggregationError::query_failure(format!(
            "seed query for group {group} on {date} returned no rows"
        ))
    })?;

    row.get_i64("received")?
        .checked_sub(row.get_i64("sent")?)
        .ok_or_else(|| AggregationError::arithmetic_overflow("seed balance", group))
}
