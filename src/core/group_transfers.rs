//! Directed group-transfer accumulation
//!
//! Maintains `daily_group_transfer`: one row per (origin group, destination
//! group, date) holding the running sum and count of transfers. Direction
//! matters; transfers 1 -> 2 and 2 -> 1 land in different rows.

use crate::core::traits::DataStore;
use crate::types::{AggregationError, GroupId};
use chrono::NaiveDate;

const UPSERT_GROUP_TRANSFER: &str = "\
    INSERT INTO daily_group_transfer \
        (origin_group_id, destination_group_id, date, sum_transfers, num_transfers) \
    VALUES (?1, ?2, ?3, ?4, 1) \
    ON CONFLICT (origin_group_id, destination_group_id, date) DO UPDATE SET \
        sum_transfers = daily_group_transfer.sum_transfers + excluded.sum_transfers, \
        num_transfers = daily_group_transfer.num_transfers + 1";

/// Add one transfer of `units` to the (origin, destination, date) row
///
/// A single atomic upsert: concurrent writers on the same key accumulate
/// instead of losing updates. A sum that would leave the `i64` range fails
/// with `ArithmeticOverflow` and leaves the row untouched.
pub fn accumulate<S: DataStore + ?Sized>(
    store: &mut S,
    origin: GroupId,
    destination: GroupId,
    date: NaiveDate,
    units: i64,
) -> Result<(), AggregationError> {
    let affected = store
        .execute_update(
            UPSERT_GROUP_TRANSFER,
            &[origin.into(), destination.into(), date.into(), units.into()],
        )
        .map_err(|e| e.for_group(origin))?;

    if affected != 1 {
        return Err(AggregationError::query_failure(format!(
            "group transfer upsert for ({origin}, {destination}, {date}) affected {affected} rows"
        )));
    }

    Ok(())
}
