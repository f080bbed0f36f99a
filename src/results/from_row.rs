use chrono::NaiveDateTime;

use super::row::CustomDbRow;
use crate::error::SqlBindError;
use crate::types::RowValues;

/// Construct a value from a keyed result row.
///
/// Attaching a type to a statement routes every returned row object through this
/// trait. Positional arrays, columns and scalars are never mapped.
pub trait FromRow: Sized + Send + 'static {
    /// # Errors
    /// Returns `SqlBindError::RowMapping` when the row lacks a column or holds an
    /// unexpected value type.
    fn from_row(row: &CustomDbRow) -> Result<Self, SqlBindError>;
}

impl FromRow for CustomDbRow {
    fn from_row(row: &CustomDbRow) -> Result<Self, SqlBindError> {
        Ok(row.clone())
    }
}

/// Construct a value from a single non-`NULL` field, as returned by `value_as`.
pub trait FromValue: Sized + Send + 'static {
    /// # Errors
    /// Returns `SqlBindError::RowMapping` when the field holds another type.
    fn from_value(value: RowValues) -> Result<Self, SqlBindError>;
}

fn mismatch(expected: &str, value: &RowValues) -> SqlBindError {
    SqlBindError::RowMapping(format!("expected {expected}, got {value:?}"))
}

impl FromValue for RowValues {
    fn from_value(value: RowValues) -> Result<Self, SqlBindError> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: RowValues) -> Result<Self, SqlBindError> {
        value.as_bool().ok_or_else(|| mismatch("a boolean", &value))
    }
}

impl FromValue for i64 {
    fn from_value(value: RowValues) -> Result<Self, SqlBindError> {
        value.as_int().copied().ok_or_else(|| mismatch("an integer", &value))
    }
}

impl FromValue for f64 {
    fn from_value(value: RowValues) -> Result<Self, SqlBindError> {
        value.as_float().ok_or_else(|| mismatch("a number", &value))
    }
}

impl FromValue for String {
    fn from_value(value: RowValues) -> Result<Self, SqlBindError> {
        match value {
            RowValues::Text(text) => Ok(text),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: RowValues) -> Result<Self, SqlBindError> {
        value.as_timestamp().ok_or_else(|| mismatch("a timestamp", &value))
    }
}
