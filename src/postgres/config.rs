use std::sync::Arc;

use tokio_postgres::NoTls;

use crate::connection::Connection;
use crate::error::SqlBindError;
use crate::schema::{Dialect, NamingStrategy, SchemaConfig};

use super::engine::PostgresEngine;

/// Options for connecting to `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PostgresOptions {
    pub config: tokio_postgres::Config,
    pub schema: SchemaConfig,
}

impl PostgresOptions {
    #[must_use]
    pub fn new(config: tokio_postgres::Config) -> Self {
        Self {
            config,
            schema: SchemaConfig::new(Dialect::Postgres),
        }
    }

    /// Parse a `postgres://` URL or a `key=value` connection string.
    ///
    /// # Errors
    /// Returns `SqlBindError::ConfigError` if the string cannot be parsed.
    pub fn from_url(url: &str) -> Result<Self, SqlBindError> {
        let config = url
            .parse::<tokio_postgres::Config>()
            .map_err(|e| SqlBindError::ConfigError(format!("invalid postgres url: {e}")))?;
        Ok(Self::new(config))
    }

    #[must_use]
    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.schema.naming = naming;
        self
    }

    fn validate(&self) -> Result<(), SqlBindError> {
        if self.config.get_dbname().is_none() {
            return Err(SqlBindError::ConfigError("dbname is required".to_string()));
        }
        if self.config.get_hosts().is_empty() {
            return Err(SqlBindError::ConfigError("host is required".to_string()));
        }
        if self.config.get_user().is_none() {
            return Err(SqlBindError::ConfigError("user is required".to_string()));
        }
        Ok(())
    }
}

/// Fluent builder for `PostgreSQL` options.
#[derive(Debug, Clone)]
pub struct PostgresOptionsBuilder {
    opts: PostgresOptions,
}

impl PostgresOptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            opts: PostgresOptions::new(tokio_postgres::Config::new()),
        }
    }

    #[must_use]
    pub fn host(mut self, host: &str) -> Self {
        self.opts.config.host(host);
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.config.port(port);
        self
    }

    #[must_use]
    pub fn dbname(mut self, dbname: &str) -> Self {
        self.opts.config.dbname(dbname);
        self
    }

    #[must_use]
    pub fn user(mut self, user: &str) -> Self {
        self.opts.config.user(user);
        self
    }

    #[must_use]
    pub fn password(mut self, password: &str) -> Self {
        self.opts.config.password(password);
        self
    }

    #[must_use]
    pub fn naming(mut self, naming: NamingStrategy) -> Self {
        self.opts.schema.naming = naming;
        self
    }

    #[must_use]
    pub fn finish(self) -> PostgresOptions {
        self.opts
    }

    /// Connect and wrap the client in a [`Connection`].
    ///
    /// # Errors
    /// Returns `SqlBindError` if validation or the connection fails.
    pub async fn build(self) -> Result<Connection, SqlBindError> {
        Connection::new_postgres(self.finish()).await
    }
}

impl Default for PostgresOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    #[must_use]
    pub fn postgres_builder() -> PostgresOptionsBuilder {
        PostgresOptionsBuilder::new()
    }

    /// Connect to `PostgreSQL` without TLS.
    ///
    /// # Errors
    /// Returns `SqlBindError::ConfigError` if `dbname`, `host` or `user` is missing, or
    /// the connection failure.
    pub async fn new_postgres(opts: PostgresOptions) -> Result<Self, SqlBindError> {
        opts.validate()?;
        let (client, connection) = opts.config.connect(NoTls).await.map_err(|e| {
            SqlBindError::ConnectionError(format!("Failed to connect to Postgres: {e}"))
        })?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "postgres connection terminated");
            }
        });
        tracing::info!(
            dbname = opts.config.get_dbname().unwrap_or_default(),
            "opened postgres connection"
        );
        let engine = PostgresEngine::new(client, driver);
        Ok(Connection::with_config(Arc::new(engine), opts.schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_fills_config() {
        let opts = PostgresOptions::from_url("postgres://app@localhost:5433/appdb").unwrap();
        assert_eq!(opts.config.get_dbname(), Some("appdb"));
        assert_eq!(opts.config.get_user(), Some("app"));
        assert_eq!(opts.config.get_ports(), &[5433]);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn missing_dbname_is_config_error() {
        let opts = PostgresOptionsBuilder::new()
            .host("localhost")
            .user("app")
            .finish();
        assert!(matches!(
            opts.validate(),
            Err(SqlBindError::ConfigError(msg)) if msg.contains("dbname")
        ));
    }
}
