//! Core business logic module
//!
//! This module contains the aggregation components:
//! - `traits` - The `DataStore` contract every update goes through
//! - `engine` - Per-transaction orchestration and atomicity
//! - `group_transfers` - Directed daily group-to-group totals
//! - `group_balance` - Per-group daily balances with seeded first rows
//! - `recent_activity` - Bounded per-account activity window
//! - `reports` - Typed reads of the aggregates

pub mod engine;
pub mod group_balance;
pub mod group_transfers;
pub mod recent_activity;
pub mod reports;
pub mod traits;

pub use engine::AggregationEngine;
pub use recent_activity::RECENT_ACTIVITY_LIMIT;
pub use traits::DataStore;
