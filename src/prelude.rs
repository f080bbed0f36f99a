//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and macros
//! to make it easier to get started with the library.

pub use crate::connection::{Connection, InsertOptions, UpdateOptions};
pub use crate::error::SqlBindError;
pub use crate::query::{Fragment, Query, SqlBuilder, SqlTemplate};
pub use crate::results::{CustomDbRow, FromRow, FromValue, ResultSet};
pub use crate::schema::{
    ColumnDef, ColumnType, Dialect, Model, NamingStrategy, SchemaConfig, TableDef,
};
pub use crate::statement::Statement;
pub use crate::types::{CallArgs, Changes, DatabaseType, NamedParams, RowValues};
pub use crate::{params, sql};

#[cfg(feature = "postgres")]
pub use crate::postgres::{PostgresOptions, PostgresOptionsBuilder};
#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteOptions, SqliteOptionsBuilder};
