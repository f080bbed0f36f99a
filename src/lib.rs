//! Named parameters, call-time argument binding and result shaping on top of engines
//! that only understand ordinal `$N` placeholders.
//!
//! SQL reaches a [`Connection`] as a positional template ([`sql!`]), as text with
//! `$name` placeholders ([`Query::named`]), or from an external query builder. Named
//! SQL is rewritten once into a [`QueryDescriptor`]; each execution of a
//! [`Statement`] then resolves its argument against that descriptor.
//!
//! ```rust,no_run
//! use sqlbind::prelude::*;
//!
//! # async fn demo() -> Result<(), SqlBindError> {
//! let conn = Connection::sqlite_builder(":memory:").build().await?;
//! conn.run(Query::raw("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")).await?;
//! conn.exec(Query::named(
//!     "INSERT INTO users (name) VALUES ($name)",
//!     params! { "name" => "Ada" },
//! ))
//! .await?;
//! let name = conn.value(sqlbind::sql!("SELECT name FROM users WHERE id = {}", 1)).await?;
//! assert_eq!(name, Some(RowValues::Text("Ada".into())));
//! # Ok(()) }
//! ```

pub mod connection;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod query;
pub mod reconcile;
pub mod results;
pub mod rewrite;
pub mod schema;
pub mod statement;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use connection::{Connection, InsertOptions, UpdateOptions};
pub use engine::{Engine, ExecOutcome};
pub use error::SqlBindError;
pub use query::{Fragment, Query, SqlBuilder, SqlTemplate};
pub use reconcile::resolve;
pub use results::{CustomDbRow, FromRow, FromValue, ResultSet};
pub use rewrite::{OriginalQuery, QueryDescriptor, rewrite};
pub use schema::{
    ColumnDef, ColumnType, Dialect, DialectSchema, Model, NamingStrategy, Schema, SchemaConfig,
    TableDef,
};
pub use statement::Statement;
pub use types::{Capabilities, CallArgs, Changes, DatabaseType, NamedParams, RowValues};

#[cfg(feature = "postgres")]
pub use postgres::{PostgresEngine, PostgresOptions, PostgresOptionsBuilder};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteEngine, SqliteOptions, SqliteOptionsBuilder};
