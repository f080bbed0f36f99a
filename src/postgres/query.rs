use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;
use tokio_postgres::Row;

use crate::error::SqlBindError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// # Errors
/// Returns `SqlBindError` if the column cannot be retrieved.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<RowValues, SqlBindError> {
    let type_info = row.columns()[idx].type_();

    match type_info.name() {
        "int2" => {
            let val: Option<i16> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))))
        }
        "int4" => {
            let val: Option<i32> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))))
        }
        "int8" => {
            let val: Option<i64> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Int))
        }
        "float4" => {
            let val: Option<f32> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Float(f64::from(v))))
        }
        "float8" => {
            let val: Option<f64> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Float))
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Bool))
        }
        "timestamp" => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Timestamp))
        }
        "json" | "jsonb" => {
            let val: Option<Value> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::JSON))
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Blob))
        }
        // Text types, and anything else readable as a string
        _ => {
            let val: Option<String> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Text))
        }
    }
}

/// Build a result set using statement column metadata.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_result_set(
    columns: &[tokio_postgres::Column],
    rows: &[Row],
) -> Result<ResultSet, SqlBindError> {
    let column_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(Arc::new(column_names));

    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Rows as positional arrays, without building column metadata.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn rows_to_arrays(rows: &[Row]) -> Result<Vec<Vec<RowValues>>, SqlBindError> {
    rows.iter()
        .map(|row| {
            (0..row.columns().len())
                .map(|idx| postgres_extract_value(row, idx))
                .collect()
        })
        .collect()
}
