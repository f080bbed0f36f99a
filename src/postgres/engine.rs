use std::fmt;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_postgres::Client;

use super::params::Params;
use super::query::{build_result_set, rows_to_arrays};
use crate::engine::{Engine, ExecOutcome};
use crate::error::SqlBindError;
use crate::results::ResultSet;
use crate::types::{DatabaseType, RowValues};

struct Live {
    client: Client,
    driver: JoinHandle<()>,
}

/// Async engine over a single `tokio-postgres` client.
pub struct PostgresEngine {
    inner: RwLock<Option<Live>>,
}

impl PostgresEngine {
    /// Wrap a connected client and the task driving its connection.
    #[must_use]
    pub fn new(client: Client, driver: JoinHandle<()>) -> Self {
        Self {
            inner: RwLock::new(Some(Live { client, driver })),
        }
    }
}

impl fmt::Debug for PostgresEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresEngine").finish_non_exhaustive()
    }
}

fn closed() -> SqlBindError {
    SqlBindError::ConnectionError("postgres connection is closed".to_string())
}

#[async_trait]
impl Engine for PostgresEngine {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgres
    }

    async fn query(
        &self,
        sql: &str,
        params: Option<&[RowValues]>,
    ) -> Result<ResultSet, SqlBindError> {
        let guard = self.inner.read().await;
        let live = guard.as_ref().ok_or_else(closed)?;
        let stmt = live.client.prepare(sql).await?;
        let params = Params::convert(params);
        let rows = live.client.query(&stmt, params.as_refs()).await?;
        build_result_set(stmt.columns(), &rows)
    }

    async fn query_arrays(
        &self,
        sql: &str,
        params: Option<&[RowValues]>,
    ) -> Result<Vec<Vec<RowValues>>, SqlBindError> {
        let guard = self.inner.read().await;
        let live = guard.as_ref().ok_or_else(closed)?;
        let params = Params::convert(params);
        let rows = live.client.query(sql, params.as_refs()).await?;
        rows_to_arrays(&rows)
    }

    async fn execute(
        &self,
        sql: &str,
        params: Option<&[RowValues]>,
    ) -> Result<ExecOutcome, SqlBindError> {
        let guard = self.inner.read().await;
        let live = guard.as_ref().ok_or_else(closed)?;
        let stmt = live.client.prepare(sql).await?;
        let params = Params::convert(params);
        if stmt.columns().is_empty() {
            let rows_affected = live.client.execute(&stmt, params.as_refs()).await?;
            return Ok(ExecOutcome {
                rows_affected,
                returned: Vec::new(),
            });
        }
        let rows = live.client.query(&stmt, params.as_refs()).await?;
        Ok(ExecOutcome {
            rows_affected: rows.len() as u64,
            returned: rows_to_arrays(&rows)?,
        })
    }

    async fn close(&self) -> Result<(), SqlBindError> {
        if let Some(live) = self.inner.write().await.take() {
            drop(live.client);
            // The driver exits on its own once the client is gone.
            if let Err(e) = live.driver.await {
                tracing::warn!(error = %e, "postgres connection task failed on close");
            }
        }
        Ok(())
    }
}
