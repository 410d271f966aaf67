//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over transactions from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding Result<Transaction, String>
//! for each CSV row:
//!
//! ```no_run
//! use economy_metrics::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("transactions.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(tx) => println!("Read transaction: {}", tx),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record parsing errors are yielded as Err variants in the iterator
//! - Line numbers are included in error messages for debugging

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{AggregationError, Transaction};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Reads one record at a time; memory use does not grow with file size.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file could not be opened.
    pub fn new(path: &Path) -> Result<Self, AggregationError> {
        let file = File::open(path).map_err(|e| AggregationError::Io {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<Transaction, String>;

    /// Get the next transaction from the CSV file
    ///
    /// # Returns
    ///
    /// * `Some(Ok(Transaction))` - Successfully parsed record
    /// * `Some(Err(String))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();

        let result = deserializer.next()?;
        self.line_num += 1;

        // header is line 1
        Some(match result {
            Ok(csv_record) => convert_csv_record(csv_record)
                .map_err(|e| format!("Line {}: {}", self.line_num + 1, e)),
            Err(e) => Err(format!(
                "Line {}: CSV parse error: {}",
                self.line_num + 1,
                e
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "id,amount,sender,sender_group,recipient,recipient_group,timestamp\n";

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_reader_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));
        assert!(matches!(result, Err(AggregationError::Io { .. })));
    }

    #[test]
    fn test_sync_reader_iterates_valid_rows() {
        let csv = format!(
            "{HEADER}1,500,10,1,20,2,2024-01-01 10:00:00\n2, 200.5 ,20,2,10,1,2024-01-01T11:00:00\n"
        );
        let file = create_temp_csv(&csv);

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 2);
        let second = records[1].as_ref().unwrap();
        assert_eq!(second.amount, Decimal::new(2005, 1));
        assert_eq!(second.sender.id, 20);
    }

    #[test]
    fn test_sync_reader_reports_line_numbers_and_continues() {
        let csv = format!(
            "{HEADER}1,500,10,1,20,2,2024-01-01\nx,1,10,1,20,2,2024-01-01\n3,-4,10,1,20,2,2024-01-01\n4,1,10,1,20,2,2024-01-02\n"
        );
        let file = create_temp_csv(&csv);

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 4);
        assert!(records[0].is_ok());
        assert!(records[1].as_ref().unwrap_err().starts_with("Line 3: CSV parse error"));
        assert!(records[2].as_ref().unwrap_err().starts_with("Line 4:"));
        assert_eq!(records[3].as_ref().unwrap().id, 4);
    }

    #[test]
    fn test_sync_reader_empty_file() {
        let file = create_temp_csv(HEADER);
        assert_eq!(SyncReader::new(file.path()).unwrap().count(), 0);
    }
}
