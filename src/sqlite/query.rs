use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{Connection, Statement, params_from_iter};

use crate::engine::ExecOutcome;
use crate::error::SqlBindError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns `SqlBindError` if the value cannot be read.
pub fn sqlite_extract_value_sync(row: &rusqlite::Row, idx: usize) -> Result<RowValues, SqlBindError> {
    let value: Value = row.get(idx)?;
    match value {
        Value::Null => Ok(RowValues::Null),
        Value::Integer(i) => Ok(RowValues::Int(i)),
        Value::Real(f) => Ok(RowValues::Float(f)),
        Value::Text(s) => Ok(RowValues::Text(s)),
        Value::Blob(b) => Ok(RowValues::Blob(b)),
    }
}

/// Build a result set from a prepared `SQLite` statement.
///
/// # Errors
/// Returns `SqlBindError::SqliteError` if execution or row extraction fails.
pub fn build_result_set(stmt: &mut Statement, params: &[Value]) -> Result<ResultSet, SqlBindError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();

    let mut rows_iter = stmt.query(params_from_iter(params.iter()))?;
    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    while let Some(row) = rows_iter.next()? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value_sync(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Run a `SELECT` (or any statement producing rows).
///
/// # Errors
/// Returns `SqlBindError::SqliteError` on prepare or execution failure.
pub fn select(conn: &Connection, sql: &str, params: &[Value]) -> Result<ResultSet, SqlBindError> {
    let mut stmt = conn.prepare(sql)?;
    build_result_set(&mut stmt, params)
}

/// Run a mutating statement.
///
/// Statements that produce columns (`RETURNING`) are stepped as queries and their row
/// count is the affected count; the rest go through `execute`.
///
/// # Errors
/// Returns `SqlBindError::SqliteError` on prepare or execution failure.
pub fn execute(conn: &Connection, sql: &str, params: &[Value]) -> Result<ExecOutcome, SqlBindError> {
    let mut stmt = conn.prepare(sql)?;
    if stmt.column_count() == 0 {
        let rows_affected = stmt.execute(params_from_iter(params.iter()))?;
        return Ok(ExecOutcome {
            rows_affected: rows_affected as u64,
            returned: Vec::new(),
        });
    }
    let returned = build_result_set(&mut stmt, params)?.into_arrays();
    Ok(ExecOutcome {
        rows_affected: returned.len() as u64,
        returned,
    })
}
