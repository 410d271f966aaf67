//! Data store adapter
//!
//! - `value` - Parameter and row types shared by every `DataStore`
//! - `schema` - DDL for the aggregate tables
//! - `sqlite` - SQLite implementation of `DataStore`

pub mod schema;
pub mod sqlite;
pub mod value;

pub use sqlite::{SqliteStore, DEFAULT_BUSY_TIMEOUT, IN_MEMORY};
pub use value::{Row, StoreValue, DATE_FORMAT, TIMESTAMP_FORMAT};
