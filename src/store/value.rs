//! Statement parameters and result rows
//!
//! `StoreValue` is the only value type crossing the `DataStore` boundary.
//! Dates and timestamps travel as fixed-width text so that lexicographic and
//! chronological order agree inside the store.

use crate::types::{from_units, AggregationError};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Text format for persisted dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text format for persisted timestamps (nanosecond precision, fixed width)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

/// A statement parameter or result column value
#[derive(Debug, Clone, PartialEq)]
pub enum StoreValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for StoreValue {
    fn from(value: i64) -> Self {
        StoreValue::Integer(value)
    }
}

impl From<usize> for StoreValue {
    fn from(value: usize) -> Self {
        StoreValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<bool> for StoreValue {
    fn from(value: bool) -> Self {
        StoreValue::Integer(i64::from(value))
    }
}

impl From<&str> for StoreValue {
    fn from(value: &str) -> Self {
        StoreValue::Text(value.to_string())
    }
}

impl From<String> for StoreValue {
    fn from(value: String) -> Self {
        StoreValue::Text(value)
    }
}

impl From<NaiveDate> for StoreValue {
    fn from(value: NaiveDate) -> Self {
        StoreValue::Text(value.format(DATE_FORMAT).to_string())
    }
}

impl From<NaiveDateTime> for StoreValue {
    fn from(value: NaiveDateTime) -> Self {
        StoreValue::Text(value.format(TIMESTAMP_FORMAT).to_string())
    }
}

impl<T: Into<StoreValue>> From<Option<T>> for StoreValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(StoreValue::Null, Into::into)
    }
}

/// One result row, keyed by column name
///
/// Accessors return `QueryFailure` for a missing column or a value of the
/// wrong type; the engine treats both as a failed statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: HashMap<String, StoreValue>,
}

impl Row {
    pub fn new(columns: HashMap<String, StoreValue>) -> Self {
        Row { columns }
    }

    fn require(&self, column: &str) -> Result<&StoreValue, AggregationError> {
        self.columns
            .get(column)
            .ok_or_else(|| AggregationError::query_failure(format!("missing column '{column}'")))
    }

    fn mistyped(column: &str, expected: &str, value: &StoreValue) -> AggregationError {
        AggregationError::query_failure(format!(
            "column '{column}' expected {expected}, found {value:?}"
        ))
    }

    /// Integer column; `NULL` is an error
    pub fn get_i64(&self, column: &str) -> Result<i64, AggregationError> {
        match self.require(column)? {
            StoreValue::Integer(v) => Ok(*v),
            other => Err(Self::mistyped(column, "integer", other)),
        }
    }

    pub fn get_bool(&self, column: &str) -> Result<bool, AggregationError> {
        Ok(self.get_i64(column)? != 0)
    }

    pub fn get_text(&self, column: &str) -> Result<&str, AggregationError> {
        match self.require(column)? {
            StoreValue::Text(v) => Ok(v.as_str()),
            other => Err(Self::mistyped(column, "text", other)),
        }
    }

    pub fn get_date(&self, column: &str) -> Result<NaiveDate, AggregationError> {
        let text = self.get_text(column)?;
        NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| {
            AggregationError::query_failure(format!("column '{column}' is not a date: {e}"))
        })
    }

    pub fn get_datetime(&self, column: &str) -> Result<NaiveDateTime, AggregationError> {
        let text = self.get_text(column)?;
        NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map_err(|e| {
            AggregationError::query_failure(format!("column '{column}' is not a timestamp: {e}"))
        })
    }

    /// Fixed-point amount column, decoded into a `Decimal`
    pub fn get_units(&self, column: &str) -> Result<Decimal, AggregationError> {
        self.get_i64(column).map(from_units)
    }
}
