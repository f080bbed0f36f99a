use std::sync::Arc;

use crate::engine::Engine;
use crate::error::SqlBindError;
use crate::query::{Query, QuerySource};
use crate::results::{FromRow, FromValue};
use crate::rewrite::{QueryDescriptor, rewrite};
use crate::schema::{DialectSchema, Model, Schema, SchemaConfig, TableDef};
use crate::statement::Statement;
use crate::types::{CallArgs, Capabilities, Changes, NamedParams, RowValues};

/// Column restriction for [`Connection::insert`] and [`Connection::insert_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOptions {
    /// Bind only these props.
    pub only_props: Option<Vec<String>>,
    /// Bind only props whose value is not `NULL`.
    pub only_with_values: bool,
}

impl InsertOptions {
    #[must_use]
    pub fn only_props<I, S>(props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only_props: Some(props.into_iter().map(Into::into).collect()),
            only_with_values: false,
        }
    }

    #[must_use]
    pub fn only_with_values() -> Self {
        Self {
            only_props: None,
            only_with_values: true,
        }
    }

    fn is_restricted(&self) -> bool {
        self.only_props.is_some() || self.only_with_values
    }

    fn restriction(&self, params: &NamedParams) -> Option<Vec<String>> {
        if let Some(props) = &self.only_props {
            Some(props.clone())
        } else if self.only_with_values {
            Some(props_with_values(params))
        } else {
            None
        }
    }
}

/// Column restriction for [`Connection::update`]. Primary keys are always bound.
pub type UpdateOptions = InsertOptions;

fn props_with_values(params: &NamedParams) -> Vec<String> {
    params
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(prop, _)| prop.clone())
        .collect()
}

fn with_primary_keys(mut props: Vec<String>, keys: Vec<String>) -> Vec<String> {
    for key in keys {
        if !props.contains(&key) {
            props.push(key);
        }
    }
    props
}

/// An engine handle plus the schema collaborator that writes model SQL for it.
///
/// Cloning is cheap and every clone drives the same engine handle; executions from
/// several clones may be in flight at once.
#[derive(Debug, Clone)]
pub struct Connection {
    engine: Arc<dyn Engine>,
    schema: Arc<dyn Schema>,
}

impl Connection {
    #[must_use]
    pub fn new(engine: Arc<dyn Engine>, schema: Arc<dyn Schema>) -> Self {
        Self { engine, schema }
    }

    /// Connection using the built-in [`DialectSchema`].
    #[must_use]
    pub fn with_config(engine: Arc<dyn Engine>, config: SchemaConfig) -> Self {
        Self::new(engine, Arc::new(DialectSchema::new(config)))
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    #[must_use]
    pub fn schema(&self) -> &dyn Schema {
        self.schema.as_ref()
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.engine.capabilities()
    }

    #[must_use]
    pub fn quote(&self, symbol: &str) -> String {
        self.schema.quote(symbol)
    }

    /// Build a statement for `query` and the argument it should be executed with.
    ///
    /// Template queries become positional statements directly; named queries and
    /// builder fragments go through [`rewrite`] and re-supply their bag, even an
    /// empty one, so absent names bind `NULL`. Raw SQL carries no argument.
    ///
    /// # Errors
    /// Returns `SqlBindError::MissingParameter` from the named rewrite.
    pub fn prepare<R: FromRow>(
        &self,
        query: Query<R>,
    ) -> Result<(Statement<R>, CallArgs), SqlBindError> {
        let (descriptor, args) = match query.source {
            QuerySource::Template(template) => {
                let (sql, values) = template.into_parts();
                let args = CallArgs::Positional(values.clone());
                (QueryDescriptor::positional(sql, values), args)
            }
            QuerySource::Named { sql, params } => {
                let descriptor = rewrite(&sql, &params)?;
                (descriptor, CallArgs::Named(params))
            }
            QuerySource::Raw(sql) => (rewrite(&sql, &NamedParams::new())?, CallArgs::Empty),
        };
        Ok((
            Statement::new(Arc::clone(&self.engine), Arc::new(descriptor)),
            args,
        ))
    }

    /// Prepare raw SQL with `$name` placeholders for repeated execution.
    ///
    /// Pass an empty bag to defer binding until the statement runs.
    ///
    /// # Errors
    /// Returns `SqlBindError::MissingParameter` from the named rewrite.
    pub fn prepare_named(
        &self,
        sql: &str,
        params: NamedParams,
    ) -> Result<Statement, SqlBindError> {
        let descriptor = rewrite(sql, &params)?;
        Ok(Statement::new(
            Arc::clone(&self.engine),
            Arc::new(descriptor),
        ))
    }

    /// # Errors
    /// Always `NotImplemented`: engines bound through this crate are async-only.
    pub fn prepare_sync<R: FromRow>(&self, _query: Query<R>) -> Result<Statement<R>, SqlBindError> {
        Err(SqlBindError::not_implemented("prepare_sync"))
    }

    /// # Errors
    /// Returns rewrite, argument, engine, or row mapping errors.
    pub async fn all<R: FromRow>(&self, query: Query<R>) -> Result<Vec<R>, SqlBindError> {
        let (stmt, args) = self.prepare(query)?;
        stmt.all(args).await
    }

    /// # Errors
    /// Returns rewrite, argument, engine, or row mapping errors.
    pub async fn one<R: FromRow>(&self, query: Query<R>) -> Result<Option<R>, SqlBindError> {
        let (stmt, args) = self.prepare(query)?;
        stmt.one(args).await
    }

    /// # Errors
    /// Returns rewrite, argument, or engine errors.
    pub async fn column<R: FromRow>(&self, query: Query<R>) -> Result<Vec<RowValues>, SqlBindError> {
        let (stmt, args) = self.prepare(query)?;
        stmt.column(args).await
    }

    /// # Errors
    /// Returns rewrite, argument, or engine errors.
    pub async fn value<R: FromRow>(
        &self,
        query: Query<R>,
    ) -> Result<Option<RowValues>, SqlBindError> {
        let (stmt, args) = self.prepare(query)?;
        stmt.value(args).await
    }

    /// Like [`Connection::value`], converted into `T`.
    ///
    /// # Errors
    /// Returns rewrite, argument, or engine errors, or `RowMapping` when the field
    /// cannot be converted.
    pub async fn value_as<T: FromValue, R: FromRow>(
        &self,
        query: Query<R>,
    ) -> Result<Option<T>, SqlBindError> {
        let (stmt, args) = self.prepare(query)?;
        stmt.value_as(args).await
    }

    /// # Errors
    /// Returns rewrite, argument, or engine errors.
    pub async fn arrays<R: FromRow>(
        &self,
        query: Query<R>,
    ) -> Result<Vec<Vec<RowValues>>, SqlBindError> {
        let (stmt, args) = self.prepare(query)?;
        stmt.arrays(args).await
    }

    /// # Errors
    /// Returns rewrite, argument, or engine errors.
    pub async fn array<R: FromRow>(
        &self,
        query: Query<R>,
    ) -> Result<Option<Vec<RowValues>>, SqlBindError> {
        let (stmt, args) = self.prepare(query)?;
        stmt.array(args).await
    }

    /// # Errors
    /// Returns rewrite, argument, or engine errors.
    pub async fn exec<R: FromRow>(&self, query: Query<R>) -> Result<Changes, SqlBindError> {
        let (stmt, args) = self.prepare(query)?;
        stmt.exec(args).await
    }

    /// # Errors
    /// Returns rewrite, argument, or engine errors.
    pub async fn run<R: FromRow>(&self, query: Query<R>) -> Result<(), SqlBindError> {
        let (stmt, args) = self.prepare(query)?;
        stmt.run(args).await
    }

    fn returning_suffix(&self, table: &TableDef) -> String {
        table
            .auto_increment_column()
            .map(|column| format!(" RETURNING {}", self.schema.column_name(column)))
            .unwrap_or_default()
    }

    /// Insert one row.
    ///
    /// A table with a generated key gets a `RETURNING` clause so the new key is
    /// reported as `last_insert_rowid`.
    ///
    /// # Errors
    /// Returns rewrite or engine errors.
    pub async fn insert<M: Model>(
        &self,
        row: &M,
        options: &InsertOptions,
    ) -> Result<Changes, SqlBindError> {
        let table = M::table();
        let params = row.to_params();
        let only = options.restriction(&params);
        let sql = self.schema.insert(&table, only.as_deref()) + &self.returning_suffix(&table);
        let stmt = self.prepare_named(&sql, NamedParams::new())?;
        let db_row = self.schema.to_db_object(&table, params, only.as_deref());
        stmt.exec(db_row).await
    }

    /// Insert each row in order.
    ///
    /// Without a restriction the insert statement is prepared once and reused for
    /// every row. `changes` is summed; `last_insert_rowid` comes from the last row.
    ///
    /// # Errors
    /// Returns the first rewrite or engine error; earlier rows stay inserted.
    pub async fn insert_all<M: Model>(
        &self,
        rows: &[M],
        options: &InsertOptions,
    ) -> Result<Changes, SqlBindError> {
        let mut ret = Changes::default();
        if rows.is_empty() {
            return Ok(ret);
        }
        if options.is_restricted() {
            for row in rows {
                let last = self.insert(row, options).await?;
                ret.changes += last.changes;
                ret.last_insert_rowid = last.last_insert_rowid;
            }
        } else {
            let table = M::table();
            let sql = self.schema.insert(&table, None) + &self.returning_suffix(&table);
            let stmt = self.prepare_named(&sql, NamedParams::new())?;
            for row in rows {
                let db_row = self.schema.to_db_object(&table, row.to_params(), None);
                let last = stmt.exec(db_row).await?;
                ret.changes += last.changes;
                ret.last_insert_rowid = last.last_insert_rowid;
            }
        }
        Ok(ret)
    }

    /// Update one row, targeted by its primary key.
    ///
    /// Under a restriction the primary-key props are always added to the bound set.
    /// When no non-key column is left to assign, nothing is executed and
    /// `changes` is `0`.
    ///
    /// # Errors
    /// Returns `ConfigError` for a table without a primary key, otherwise rewrite or
    /// engine errors.
    pub async fn update<M: Model>(
        &self,
        row: &M,
        options: &UpdateOptions,
    ) -> Result<Changes, SqlBindError> {
        let table = M::table();
        let keys = require_primary_keys(&table)?;
        let params = row.to_params();
        let only = options
            .restriction(&params)
            .map(|props| with_primary_keys(props, keys));
        let assigns_any = table
            .columns
            .iter()
            .any(|c| !c.primary_key && only.as_ref().is_none_or(|only| only.contains(&c.prop)));
        if !assigns_any {
            tracing::debug!(table = %table.name, "update has no columns to set; skipped");
            return Ok(Changes::default());
        }
        let stmt = self.prepare_named(
            &self.schema.update(&table, only.as_deref()),
            NamedParams::new(),
        )?;
        let db_row = self.schema.to_db_object(&table, params, only.as_deref());
        stmt.exec(db_row).await
    }

    /// Delete one row by primary key. A row that no longer exists reports `changes: 0`.
    ///
    /// # Errors
    /// Returns `ConfigError` for a table without a primary key, otherwise rewrite or
    /// engine errors.
    pub async fn delete<M: Model>(&self, row: &M) -> Result<Changes, SqlBindError> {
        let table = M::table();
        let keys = require_primary_keys(&table)?;
        let stmt = self.prepare_named(&self.schema.delete(&table), NamedParams::new())?;
        let db_row = self
            .schema
            .to_db_object(&table, row.to_params(), Some(keys.as_slice()));
        stmt.exec(db_row).await
    }

    /// Names of the tables visible to this connection.
    ///
    /// # Errors
    /// Returns engine errors.
    pub async fn list_tables(&self) -> Result<Vec<String>, SqlBindError> {
        let names = self.column(Query::raw(self.schema.table_names())).await?;
        Ok(names
            .into_iter()
            .filter_map(|name| match name {
                RowValues::Text(name) => Some(name),
                _ => None,
            })
            .collect())
    }

    /// # Errors
    /// Returns engine errors.
    pub async fn create_table<M: Model>(&self) -> Result<(), SqlBindError> {
        self.run(Query::raw(self.schema.create_table(&M::table())))
            .await
    }

    /// # Errors
    /// Returns engine errors.
    pub async fn drop_table<M: Model>(&self) -> Result<(), SqlBindError> {
        self.run(Query::raw(self.schema.drop_table(&M::table())))
            .await
    }

    /// Close the engine handle. The connection must not be used afterwards.
    ///
    /// # Errors
    /// Returns engine errors raised while shutting down.
    pub async fn close(&self) -> Result<(), SqlBindError> {
        tracing::info!(engine = ?self.engine.database_type(), "closing connection");
        self.engine.close().await
    }

    /// # Errors
    /// Always `NotImplemented`.
    pub fn close_sync(&self) -> Result<(), SqlBindError> {
        Err(SqlBindError::not_implemented("close_sync"))
    }
}

fn require_primary_keys(table: &TableDef) -> Result<Vec<String>, SqlBindError> {
    let keys = table.primary_key_props();
    if keys.is_empty() {
        Err(SqlBindError::ConfigError(format!(
            "table {} has no primary key",
            table.name
        )))
    } else {
        Ok(keys)
    }
}
