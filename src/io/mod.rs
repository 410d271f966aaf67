//! I/O module
//!
//! Transaction sources and report output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, report serialization)
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `mock` - Seeded mock transaction generator

pub mod csv_format;
pub mod mock;
pub mod sync_reader;

pub use csv_format::{
    convert_csv_record, write_balances_csv, write_recent_activity_csv, write_transfers_csv,
    CsvRecord,
};
pub use mock::MockTransactionGenerator;
pub use sync_reader::SyncReader;
