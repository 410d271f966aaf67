//! Core trait for the data store the engine writes through
//!
//! The engine holds no durable state of its own; every read and write goes
//! through a `DataStore`. The SQLite adapter in `crate::store` is the shipped
//! implementation, and tests wrap it to inject failures.

use crate::store::{Row, StoreValue};
use crate::types::AggregationError;

/// Parameterized statement execution with explicit transaction demarcation
///
/// Statements use positional `?N` placeholders bound from `params`; callers
/// never splice values into statement text.
pub trait DataStore {
    /// Execute a non-query statement and return the number of rows affected
    fn execute_update(
        &mut self,
        statement: &str,
        params: &[StoreValue],
    ) -> Result<usize, AggregationError>;

    /// Execute a query and return its rows
    fn execute_query(
        &self,
        statement: &str,
        params: &[StoreValue],
    ) -> Result<Vec<Row>, AggregationError>;

    /// Open the write scope that the next `commit` or `rollback` closes
    fn begin(&mut self) -> Result<(), AggregationError>;

    /// Make every write since `begin` durable
    fn commit(&mut self) -> Result<(), AggregationError>;

    /// Discard every write since `begin`; a no-op when no scope is open
    fn rollback(&mut self) -> Result<(), AggregationError>;
}
