use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Values that can be stored in a database row or used as query parameters.
///
/// The same enum is used for every engine so call sites never branch on driver types:
/// ```rust
/// use sqlbind::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Booleans come back from `SQLite` as `0`/`1` integers, so both shapes are accepted.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RowValues::Bool(value) => Some(*value),
            RowValues::Int(1) => Some(true),
            RowValues::Int(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS" with optional fractional seconds
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<&String> for RowValues {
    fn from(value: &String) -> Self {
        RowValues::Text(value.clone())
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<JsonValue> for RowValues {
    fn from(value: JsonValue) -> Self {
        RowValues::JSON(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// A keyed argument bag for `$name` placeholders.
pub type NamedParams = BTreeMap<String, RowValues>;

/// Build a [`NamedParams`] bag from `key => value` pairs.
///
/// ```rust
/// use sqlbind::params;
///
/// let bag = params! { "id" => 1, "name" => "alice" };
/// assert_eq!(bag.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => { $crate::NamedParams::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut bag = $crate::NamedParams::new();
        $( bag.insert(::std::string::String::from($key), $crate::RowValues::from($value)); )+
        bag
    }};
}

/// The argument supplied when a statement is executed.
///
/// The shape is decided once, where the caller hands the value over, and the
/// reconciler matches on it exhaustively afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CallArgs {
    /// Values already in ordinal placeholder order.
    Positional(Vec<RowValues>),
    /// Values keyed by placeholder name.
    Named(NamedParams),
    /// A single bare value for a one-placeholder statement.
    Scalar(RowValues),
    /// No argument at all.
    #[default]
    Empty,
}

impl CallArgs {
    /// Human-readable name of the argument shape, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            CallArgs::Positional(_) => "positional",
            CallArgs::Named(_) => "named",
            CallArgs::Scalar(_) => "scalar",
            CallArgs::Empty => "empty",
        }
    }
}

impl From<Vec<RowValues>> for CallArgs {
    fn from(values: Vec<RowValues>) -> Self {
        CallArgs::Positional(values)
    }
}

impl From<&[RowValues]> for CallArgs {
    fn from(values: &[RowValues]) -> Self {
        CallArgs::Positional(values.to_vec())
    }
}

impl From<NamedParams> for CallArgs {
    fn from(bag: NamedParams) -> Self {
        CallArgs::Named(bag)
    }
}

impl From<RowValues> for CallArgs {
    fn from(value: RowValues) -> Self {
        CallArgs::Scalar(value)
    }
}

impl From<Option<RowValues>> for CallArgs {
    fn from(value: Option<RowValues>) -> Self {
        value.map_or(CallArgs::Empty, CallArgs::Scalar)
    }
}

impl From<()> for CallArgs {
    fn from((): ()) -> Self {
        CallArgs::Empty
    }
}

/// Outcome of a mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Changes {
    /// Number of rows affected.
    pub changes: u64,
    /// Generated key reported through a `RETURNING` clause, otherwise `0`.
    pub last_insert_rowid: i64,
}

/// The database engines this crate can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum DatabaseType {
    /// `PostgreSQL` database
    Postgres,
    /// `SQLite` database
    Sqlite,
    /// Any other engine supplied by the caller
    Custom,
}

/// What an engine binding can do beyond async execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Whether the blocking `*_sync` statement variants are available.
    pub sync: bool,
}
