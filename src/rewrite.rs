use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::SqlBindError;
use crate::types::{NamedParams, RowValues};

static NAMED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z0-9_]+)").unwrap_or_else(|e| panic!("invalid placeholder regex: {e}"))
});

/// The SQL and bound parameters a named rewrite started from.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalQuery {
    pub sql: String,
    pub params: NamedParams,
}

/// SQL with ordinal `$N` placeholders plus the metadata needed to bind it.
///
/// Descriptors are immutable once built and are shared between executions through an
/// `Arc`, so the same statement can run concurrently with different arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    /// Ordinal SQL sent to the engine.
    pub sql: String,
    /// Values in placeholder order.
    pub values: Vec<RowValues>,
    /// Original placeholder names, parallel to `values`, for rewritten SQL only.
    pub param_names: Option<Vec<String>>,
    /// Input of the rewrite, kept for diagnostics.
    pub original: Option<OriginalQuery>,
}

impl QueryDescriptor {
    /// Descriptor for SQL that already uses ordinal placeholders.
    #[must_use]
    pub fn positional(sql: impl Into<String>, values: Vec<RowValues>) -> Self {
        Self {
            sql: sql.into(),
            values,
            param_names: None,
            original: None,
        }
    }

    /// Number of ordinal slots this descriptor declares.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn has_param_names(&self) -> bool {
        self.param_names.as_ref().is_some_and(|names| !names.is_empty())
    }
}

/// Rewrite `$name` placeholders into ordinal `$1..$N` placeholders.
///
/// Every occurrence gets its own slot, so a name used twice is bound twice. When `params`
/// is empty the names are recorded but binding is deferred to execution time, and the
/// slots hold `NULL` until then.
///
/// ```rust
/// use sqlbind::{params, rewrite, RowValues};
///
/// let query = rewrite("WHERE a IN ($x,$y) OR b = $x", &params! { "x" => 1, "y" => 2 }).unwrap();
/// assert_eq!(query.sql, "WHERE a IN ($1,$2) OR b = $3");
/// assert_eq!(query.values, vec![RowValues::Int(1), RowValues::Int(2), RowValues::Int(1)]);
/// ```
///
/// # Errors
/// Returns `SqlBindError::MissingParameter` when `params` is non-empty and lacks a
/// referenced name.
pub fn rewrite(sql: &str, params: &NamedParams) -> Result<QueryDescriptor, SqlBindError> {
    let mut param_names: Vec<String> = Vec::new();
    let ordinal_sql = NAMED_PLACEHOLDER.replace_all(sql, |caps: &Captures<'_>| {
        param_names.push(caps[1].to_string());
        format!("${}", param_names.len())
    });

    let mut values = Vec::with_capacity(param_names.len());
    for name in &param_names {
        match params.get(name) {
            Some(value) => values.push(value.clone()),
            None if params.is_empty() => values.push(RowValues::Null),
            None => {
                tracing::warn!(name = %name, sql = %sql, "named parameter missing from bag");
                return Err(SqlBindError::MissingParameter {
                    name: name.clone(),
                    sql: sql.to_string(),
                    params: params.clone(),
                });
            }
        }
    }

    Ok(QueryDescriptor {
        sql: ordinal_sql.into_owned(),
        values,
        param_names: Some(param_names),
        original: Some(OriginalQuery {
            sql: sql.to_string(),
            params: params.clone(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn repeated_names_get_separate_slots() {
        let query = rewrite(
            "SELECT * FROM t WHERE a IN ($x,$y) OR b = $x",
            &params! { "x" => 1, "y" => 2 },
        )
        .unwrap();
        assert_eq!(query.sql, "SELECT * FROM t WHERE a IN ($1,$2) OR b = $3");
        assert_eq!(
            query.values,
            vec![RowValues::Int(1), RowValues::Int(2), RowValues::Int(1)]
        );
        assert_eq!(
            query.param_names,
            Some(vec!["x".to_string(), "y".to_string(), "x".to_string()])
        );
    }

    #[test]
    fn missing_name_in_non_empty_bag_fails() {
        let err = rewrite("SELECT $a, $b", &params! { "a" => 1 }).unwrap_err();
        match err {
            SqlBindError::MissingParameter { name, sql, params } => {
                assert_eq!(name, "b");
                assert_eq!(sql, "SELECT $a, $b");
                assert_eq!(params.len(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_bag_defers_binding() {
        let query = rewrite("UPDATE t SET a = $a WHERE id = $id", &NamedParams::new()).unwrap();
        assert_eq!(query.sql, "UPDATE t SET a = $1 WHERE id = $2");
        assert_eq!(query.values, vec![RowValues::Null, RowValues::Null]);
        assert_eq!(query.slot_count(), 2);
        assert!(query.has_param_names());
    }

    #[test]
    fn text_outside_placeholders_is_untouched() {
        let sql = "SELECT  'a'\n\t, \"b\"  FROM t WHERE c = $c  ";
        let query = rewrite(sql, &params! { "c" => "x" }).unwrap();
        assert_eq!(query.sql, "SELECT  'a'\n\t, \"b\"  FROM t WHERE c = $1  ");
        assert_eq!(query.original.unwrap().sql, sql);
    }

    #[test]
    fn no_placeholders_yields_no_slots() {
        let query = rewrite("SELECT 1", &NamedParams::new()).unwrap();
        assert_eq!(query.sql, "SELECT 1");
        assert!(query.values.is_empty());
        assert!(!query.has_param_names());
    }
}
