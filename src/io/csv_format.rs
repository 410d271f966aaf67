//! CSV format handling for transaction input and aggregate reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to Transactions
//! - Report serialization for the three aggregate tables
//!
//! All functions are pure (no file handling) for easy testing.

use crate::types::{
    Account, AccountId, AggregationError, DailyGroupTransfer, GroupDailyBalance, GroupId,
    RecentActivityEntry, Transaction, TransactionId, AMOUNT_SCALE,
};
use chrono::{NaiveDate, NaiveDateTime};
use csv::Writer;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Columns: id, amount, sender, sender_group, recipient, recipient_group, timestamp
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub id: TransactionId,
    pub amount: String,
    pub sender: AccountId,
    pub sender_group: GroupId,
    pub recipient: AccountId,
    pub recipient_group: GroupId,
    pub timestamp: String,
}

/// Accepted timestamp layouts, tried in order
const TIMESTAMP_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp, accepting a bare date as midnight
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();

    for layout in TIMESTAMP_LAYOUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, layout) {
            return Ok(ts);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("Invalid timestamp '{}'", value))
}

/// Convert a CsvRecord to a Transaction
///
/// This function:
/// - Parses the amount string into a Decimal and rejects negatives
/// - Rejects a sender paying itself
/// - Parses the timestamp (see `parse_timestamp`)
///
/// # Returns
///
/// Result containing either:
/// - Ok(Transaction) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Transaction, String> {
    let amount = Decimal::from_str(csv_record.amount.trim()).map_err(|_| {
        format!(
            "Invalid amount '{}' for tx {}",
            csv_record.amount, csv_record.id
        )
    })?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(format!(
            "Negative amount '{}' for tx {}",
            csv_record.amount, csv_record.id
        ));
    }

    if csv_record.sender == csv_record.recipient {
        return Err(format!(
            "Transaction {} sends from account {} to itself",
            csv_record.id, csv_record.sender
        ));
    }

    let timestamp = parse_timestamp(&csv_record.timestamp)
        .map_err(|e| format!("{} for tx {}", e, csv_record.id))?;

    Ok(Transaction::new(
        csv_record.id,
        amount,
        Account::new(csv_record.sender, csv_record.sender_group),
        Account::new(csv_record.recipient, csv_record.recipient_group),
        timestamp,
    ))
}

fn format_amount(amount: Decimal) -> String {
    format!("{:.*}", AMOUNT_SCALE as usize, amount)
}

fn flush<W: Write>(writer: Writer<W>) -> Result<(), AggregationError> {
    writer
        .into_inner()
        .map_err(|e| AggregationError::Io {
            message: e.to_string(),
        })?
        .flush()?;
    Ok(())
}

/// Write directed transfer totals: origin_group, destination_group, date, sum, count
pub fn write_transfers_csv(
    transfers: &[DailyGroupTransfer],
    output: &mut dyn Write,
) -> Result<(), AggregationError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(["origin_group", "destination_group", "date", "sum", "count"])?;

    for t in transfers {
        writer.write_record(&[
            t.origin_group.to_string(),
            t.destination_group.to_string(),
            t.date.to_string(),
            format_amount(t.sum),
            t.count.to_string(),
        ])?;
    }

    flush(writer)
}

/// Write group balances: group, date, balance
pub fn write_balances_csv(
    balances: &[GroupDailyBalance],
    output: &mut dyn Write,
) -> Result<(), AggregationError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(["group", "date", "balance"])?;

    for b in balances {
        writer.write_record(&[b.group.to_string(), b.date.to_string(), format_amount(b.amount)])?;
    }

    flush(writer)
}

/// Write an account's window: account, transaction, counterparty, direction, amount, timestamp
pub fn write_recent_activity_csv(
    entries: &[RecentActivityEntry],
    output: &mut dyn Write,
) -> Result<(), AggregationError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record([
        "account",
        "transaction",
        "counterparty",
        "direction",
        "amount",
        "timestamp",
    ])?;

    for e in entries {
        writer.write_record(&[
            e.account.to_string(),
            e.transaction_id.to_string(),
            e.counterparty.to_string(),
            e.direction.to_string(),
            format_amount(e.amount),
            e.timestamp.to_string(),
        ])?;
    }

    flush(writer)
}
