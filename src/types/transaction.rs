//! Transaction-related types for the aggregation engine
//!
//! This module defines identifiers, the immutable Transaction record handed to
//! the engine, and the direction of a party within a transaction.

use super::account::Account;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::fmt;

/// Account identifier
pub type AccountId = i64;

/// Group identifier
pub type GroupId = i64;

/// Transaction identifier
pub type TransactionId = i64;

/// A transfer of funds from one account to another
///
/// Immutable once created. The engine aggregates at date granularity and
/// orders recent activity by the full timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: TransactionId,

    /// Amount transferred, never negative
    pub amount: Decimal,

    /// Account the funds left
    pub sender: Account,

    /// Account the funds arrived at
    pub recipient: Account,

    /// When the transfer completed
    pub timestamp: NaiveDateTime,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        amount: Decimal,
        sender: Account,
        recipient: Account,
        timestamp: NaiveDateTime,
    ) -> Self {
        Transaction {
            id,
            amount,
            sender,
            recipient,
            timestamp,
        }
    }

    /// Calendar date used as the aggregation key
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

impl fmt::Display for Transaction {
    /// `id | amount | sender -> recipient`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} -> {}",
            self.id, self.amount, self.sender.id, self.recipient.id
        )
    }
}

/// Which side of a transaction an account was on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The account sent the funds
    Sent,

    /// The account received the funds
    Received,
}

impl Direction {
    /// Build from the persisted `is_sender` flag
    pub fn from_is_sender(is_sender: bool) -> Self {
        if is_sender {
            Direction::Sent
        } else {
            Direction::Received
        }
    }

    pub fn is_sender(self) -> bool {
        matches!(self, Direction::Sent)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sent => f.write_str("sent"),
            Direction::Received => f.write_str("received"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction::new(
            42,
            Decimal::new(5000, 1),
            Account::new(1000000000000001, 1),
            Account::new(2000000000000001, 2),
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
        )
    }

    #[test]
    fn test_date_truncates_timestamp() {
        assert_eq!(
            sample().date(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_display_format() {
        assert_eq!(
            sample().to_string(),
            "42 | 500.0 | 1000000000000001 -> 2000000000000001"
        );
    }

    #[test]
    fn test_direction_flag_mapping() {
        assert_eq!(Direction::from_is_sender(true), Direction::Sent);
        assert_eq!(Direction::from_is_sender(false), Direction::Received);
        assert!(Direction::Sent.is_sender());
        assert!(!Direction::Received.is_sender());
        assert_eq!(Direction::Received.to_string(), "received");
    }
}
