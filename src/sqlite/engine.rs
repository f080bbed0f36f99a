use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::params::Params;
use super::query;
use crate::engine::{Engine, ExecOutcome};
use crate::error::SqlBindError;
use crate::results::ResultSet;
use crate::translation::to_sqlite_placeholders;
use crate::types::{DatabaseType, RowValues};

type SharedSqliteConnection = Arc<Mutex<Option<rusqlite::Connection>>>;

/// Async engine over a single `rusqlite` connection.
///
/// Calls run on tokio's blocking pool and are serialized by the connection mutex.
/// `$N` placeholders are sent to `SQLite` as `?N`.
#[derive(Clone)]
pub struct SqliteEngine {
    conn: SharedSqliteConnection,
}

impl SqliteEngine {
    /// Open (or create) the database at `db_path`.
    ///
    /// # Errors
    /// Returns `SqlBindError::SqliteError` if the file cannot be opened.
    pub async fn open(db_path: &str) -> Result<Self, SqlBindError> {
        let path = db_path.to_string();
        let conn = tokio::task::spawn_blocking(move || rusqlite::Connection::open(path))
            .await
            .map_err(|e| {
                SqlBindError::ConnectionError(format!("sqlite spawn_blocking join error: {e}"))
            })??;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already opened `rusqlite` connection.
    #[must_use]
    pub fn from_connection(conn: rusqlite::Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        }
    }

    async fn with_connection<F, R>(&self, func: F) -> Result<R, SqlBindError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlBindError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(Arc::clone(&self.conn), func).await
    }
}

impl fmt::Debug for SqliteEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteEngine").finish_non_exhaustive()
    }
}

async fn run_blocking<F, R>(conn: SharedSqliteConnection, func: F) -> Result<R, SqlBindError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlBindError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        match guard.as_mut() {
            Some(conn) => func(conn),
            None => Err(SqlBindError::ConnectionError(
                "sqlite connection is closed".to_string(),
            )),
        }
    })
    .await
    .map_err(|e| SqlBindError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}

#[async_trait]
impl Engine for SqliteEngine {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    async fn query(
        &self,
        sql: &str,
        params: Option<&[RowValues]>,
    ) -> Result<ResultSet, SqlBindError> {
        let sql = to_sqlite_placeholders(sql).into_owned();
        let params = Params::convert(params);
        self.with_connection(move |conn| query::select(conn, &sql, params.as_values()))
            .await
    }

    async fn execute(
        &self,
        sql: &str,
        params: Option<&[RowValues]>,
    ) -> Result<ExecOutcome, SqlBindError> {
        let sql = to_sqlite_placeholders(sql).into_owned();
        let params = Params::convert(params);
        self.with_connection(move |conn| query::execute(conn, &sql, params.as_values()))
            .await
    }

    async fn close(&self) -> Result<(), SqlBindError> {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            tokio::task::spawn_blocking(move || conn.close().map_err(|(_, e)| e))
                .await
                .map_err(|e| {
                    SqlBindError::ExecutionError(format!("sqlite spawn_blocking join error: {e}"))
                })??;
        }
        Ok(())
    }
}
