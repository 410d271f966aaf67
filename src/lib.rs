//! Economy Metrics Library
//! # Overview
//!
//! This library turns a stream of account-to-account transfers into derived
//! metrics kept in a transactional store.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Transaction, aggregates, errors)
//! - [`store`] - The SQLite implementation of the data store contract
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Per-transaction orchestration and atomicity
//!   - [`core::group_transfers`] - Directed daily group-to-group totals
//!   - [`core::group_balance`] - Per-group daily balances
//!   - [`core::recent_activity`] - Bounded per-account activity window
//!   - [`core::reports`] - Typed reads of the aggregates
//! - [`io`] - Transaction sources (CSV, mock generator) and CSV reports
//! - [`ingest`] - The loop feeding a source through the engine
//! - [`cli`] - CLI arguments parsing and command dispatch
//!
//! # Aggregates
//!
//! For every transaction from account A (group G1) to account B (group G2):
//!
//! - **Group transfers**: the (G1, G2, date) row gains the amount and one count
//! - **Group balances**: G1 loses the amount and G2 gains it on that date; the
//!   first row of a (group, date) is seeded from the group's net transfers on
//!   earlier dates
//! - **Recent activity**: A and B each get an entry; each account keeps only
//!   its newest 20 by timestamp
//!
//! All three updates commit together or not at all.

// Module declarations
pub mod cli;
pub mod core;
pub mod ingest;
pub mod io;
pub mod store;
pub mod types;

pub use core::{AggregationEngine, DataStore, RECENT_ACTIVITY_LIMIT};
pub use ingest::{ingest, IngestConfig, IngestSummary};
pub use store::SqliteStore;
pub use types::{
    Account, AccountId, AggregationError, DailyGroupTransfer, Direction, GroupDailyBalance,
    GroupId, RecentActivityEntry, Transaction, TransactionId,
};
