use crate::connection::Connection;
use crate::error::SqlBindError;
use crate::schema::{Dialect, NamingStrategy, SchemaConfig};

use super::engine::SqliteEngine;

/// Options for opening a `SQLite` connection.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    /// File path, or `:memory:` for a private in-memory database.
    pub db_path: String,
    pub schema: SchemaConfig,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            schema: SchemaConfig::new(Dialect::Sqlite),
        }
    }

    #[must_use]
    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.schema.naming = naming;
        self
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn naming(mut self, naming: NamingStrategy) -> Self {
        self.opts.schema.naming = naming;
        self
    }

    /// Replace the whole schema configuration.
    #[must_use]
    pub fn schema(mut self, schema: SchemaConfig) -> Self {
        self.opts.schema = schema;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Open the database and wrap it in a [`Connection`].
    ///
    /// # Errors
    ///
    /// Returns `SqlBindError` if the database cannot be opened.
    pub async fn build(self) -> Result<Connection, SqlBindError> {
        Connection::new_sqlite(self.finish()).await
    }
}

impl Connection {
    #[must_use]
    pub fn sqlite_builder(db_path: impl Into<String>) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path.into())
    }

    /// Open a `SQLite` database as an async engine.
    ///
    /// # Errors
    /// Returns `SqlBindError::ConfigError` for an empty path, or the open failure.
    pub async fn new_sqlite(opts: SqliteOptions) -> Result<Self, SqlBindError> {
        if opts.db_path.is_empty() {
            return Err(SqlBindError::ConfigError("db_path is required".to_string()));
        }
        let engine = SqliteEngine::open(&opts.db_path).await?;
        tracing::info!(db_path = %opts.db_path, "opened sqlite connection");
        Ok(Connection::with_config(std::sync::Arc::new(engine), opts.schema))
    }
}
