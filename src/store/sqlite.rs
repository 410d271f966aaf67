//! SQLite implementation of the `DataStore` contract
//!
//! A thin, mechanical wrapper: bind `StoreValue` parameters, collect rows into
//! column maps, and translate begin/commit/rollback into SQL. No business
//! logic lives here.
//!
//! # Locking
//!
//! `begin` issues `BEGIN IMMEDIATE`, which takes the database write lock up
//! front. Competing engines on the same file therefore serialize on the lock
//! (bounded by the busy timeout) instead of interleaving their
//! update/check/insert sequences.

use crate::core::traits::DataStore;
use crate::store::schema::apply_schema;
use crate::store::value::{Row, StoreValue};
use crate::types::AggregationError;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Path that selects a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// Default time to wait on a locked database before failing a statement
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

impl ToSql for StoreValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            StoreValue::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            StoreValue::Integer(v) => ToSqlOutput::Borrowed(ValueRef::Integer(*v)),
            StoreValue::Real(v) => ToSqlOutput::Borrowed(ValueRef::Real(*v)),
            StoreValue::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
        })
    }
}

fn to_store_value(value: ValueRef<'_>, column: &str) -> Result<StoreValue, AggregationError> {
    match value {
        ValueRef::Null => Ok(StoreValue::Null),
        ValueRef::Integer(v) => Ok(StoreValue::Integer(v)),
        ValueRef::Real(v) => Ok(StoreValue::Real(v)),
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map(StoreValue::Text)
            .map_err(|e| {
                AggregationError::query_failure(format!("column '{column}' is not UTF-8: {e}"))
            }),
        ValueRef::Blob(_) => Err(AggregationError::query_failure(format!(
            "column '{column}' holds a blob"
        ))),
    }
}

/// SQLite-backed data store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema
    ///
    /// `":memory:"` opens a private in-memory database. File databases are
    /// switched to WAL journaling.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the database cannot be opened or is not a
    /// database, and `QueryFailure` if the schema cannot be applied.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, AggregationError> {
        let path = path.as_ref();

        if path == Path::new(IN_MEMORY) {
            return Self::open_in_memory();
        }

        let conn = Connection::open(path).map_err(|e| {
            AggregationError::store_unavailable(format!(
                "failed to open database '{}': {}",
                path.display(),
                e
            ))
        })?;
        conn.busy_timeout(busy_timeout)?;
        let journal_mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        log::info!(
            "Opened SQLite store at {} (journal_mode={})",
            path.display(),
            journal_mode
        );
        Self::with_connection(conn)
    }

    /// Open a private in-memory database with the schema applied
    pub fn open_in_memory() -> Result<Self, AggregationError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            AggregationError::store_unavailable(format!("failed to open in-memory database: {e}"))
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, AggregationError> {
        apply_schema(&conn)?;
        Ok(SqliteStore { conn })
    }

    /// Whether a write scope is currently open
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

impl DataStore for SqliteStore {
    fn execute_update(
        &mut self,
        statement: &str,
        params: &[StoreValue],
    ) -> Result<usize, AggregationError> {
        Ok(self.conn.execute(statement, params_from_iter(params))?)
    }

    fn execute_query(
        &self,
        statement: &str,
        params: &[StoreValue],
    ) -> Result<Vec<Row>, AggregationError> {
        let mut stmt = self.conn.prepare(statement)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query(params_from_iter(params))?;
        let mut result = Vec::new();

        while let Some(row) = rows.next()? {
            let mut columns = HashMap::with_capacity(names.len());
            for (index, name) in names.iter().enumerate() {
                let value = to_store_value(row.get_ref(index)?, name)?;
                columns.insert(name.clone(), value);
            }
            result.push(Row::new(columns));
        }

        Ok(result)
    }

    fn begin(&mut self) -> Result<(), AggregationError> {
        if self.in_transaction() {
            return Err(AggregationError::query_failure(
                "begin called while a transaction is already open",
            ));
        }
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), AggregationError> {
        if !self.in_transaction() {
            return Err(AggregationError::query_failure(
                "commit called without an open transaction",
            ));
        }
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), AggregationError> {
        if self.in_transaction() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}
