//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account reference carried on a transaction
//! - `transaction`: Transaction record, identifiers, and direction
//! - `aggregates`: Read-side snapshots of the derived tables
//! - `amount`: Fixed-point encoding of amounts for the store
//! - `error`: Error types for the aggregation engine

pub mod account;
pub mod aggregates;
pub mod amount;
pub mod error;
pub mod transaction;

pub use account::Account;
pub use aggregates::{DailyGroupTransfer, GroupDailyBalance, RecentActivityEntry};
pub use amount::{from_units, to_units, AMOUNT_SCALE};
pub use error::AggregationError;
pub use transaction::{AccountId, Direction, GroupId, Transaction, TransactionId};
