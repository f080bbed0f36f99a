use std::fmt;

use async_trait::async_trait;

use crate::error::SqlBindError;
use crate::results::ResultSet;
use crate::types::{Capabilities, DatabaseType, RowValues};

/// What an engine reports back after running a mutating statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecOutcome {
    /// Rows affected by the statement.
    pub rows_affected: u64,
    /// Rows produced by a `RETURNING` clause, as positional arrays.
    pub returned: Vec<Vec<RowValues>>,
}

/// The handle that actually talks to a database.
///
/// Engines only understand ordinal `$N` placeholders; everything above this trait
/// has already rewritten named and templated SQL. Errors raised by the database are
/// passed through untouched.
#[async_trait]
pub trait Engine: Send + Sync + fmt::Debug {
    fn database_type(&self) -> DatabaseType;

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Run a statement and return its rows keyed by column name.
    async fn query(
        &self,
        sql: &str,
        params: Option<&[RowValues]>,
    ) -> Result<ResultSet, SqlBindError>;

    /// Run a statement and return its rows as raw positional arrays.
    async fn query_arrays(
        &self,
        sql: &str,
        params: Option<&[RowValues]>,
    ) -> Result<Vec<Vec<RowValues>>, SqlBindError> {
        Ok(self.query(sql, params).await?.into_arrays())
    }

    /// Run a mutating statement.
    async fn execute(
        &self,
        sql: &str,
        params: Option<&[RowValues]>,
    ) -> Result<ExecOutcome, SqlBindError>;

    /// Release the underlying handle. Later calls fail with `ConnectionError`.
    async fn close(&self) -> Result<(), SqlBindError>;
}
