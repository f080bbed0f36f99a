use thiserror::Error;

use crate::types::NamedParams;

#[derive(Debug, Error)]
pub enum SqlBindError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    /// A `$name` placeholder has no entry in a non-empty named bag.
    #[error("Missing parameter: {name} (sql: {sql}, supplied: {params:?})")]
    MissingParameter {
        name: String,
        sql: String,
        params: NamedParams,
    },

    /// The call-time argument cannot be matched to the statement's placeholders.
    #[error("Invalid params ({supplied}) for query: {sql}")]
    InvalidParameters { supplied: &'static str, sql: String },

    #[error("Method not implemented: {0}")]
    NotImplemented(String),

    #[error("Row mapping error: {0}")]
    RowMapping(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl SqlBindError {
    pub(crate) fn not_implemented(method: &str) -> Self {
        SqlBindError::NotImplemented(format!(
            "{method} is not supported by async-only engines"
        ))
    }
}
