use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::engine::Engine;
use crate::error::SqlBindError;
use crate::reconcile::resolve;
use crate::results::{CustomDbRow, FromRow, FromValue};
use crate::rewrite::QueryDescriptor;
use crate::types::{CallArgs, Changes, RowValues};

/// A prepared statement: one immutable query descriptor plus a result projection.
///
/// `R` is the type each returned row object is mapped into. Switching it with
/// [`Statement::as_type`] shares the descriptor; the SQL is never rewritten again.
///
/// ```rust,no_run
/// use sqlbind::prelude::*;
///
/// # async fn demo(conn: &Connection) -> Result<(), SqlBindError> {
/// let stmt = conn.prepare_named("SELECT name FROM users WHERE id = $id", NamedParams::new())?;
/// let first = stmt.one(sqlbind::params! { "id" => 1 }).await?;
/// let name = stmt.value(sqlbind::params! { "id" => 2 }).await?;
/// # let _ = (first, name);
/// # Ok(()) }
/// ```
pub struct Statement<R = CustomDbRow> {
    engine: Arc<dyn Engine>,
    query: Arc<QueryDescriptor>,
    _into: PhantomData<fn() -> R>,
}

impl<R> Clone for Statement<R> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            query: Arc::clone(&self.query),
            _into: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Statement<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("query", &self.query)
            .field("into", &std::any::type_name::<R>())
            .finish_non_exhaustive()
    }
}

impl<R: FromRow> Statement<R> {
    pub(crate) fn new(engine: Arc<dyn Engine>, query: Arc<QueryDescriptor>) -> Self {
        Self {
            engine,
            query,
            _into: PhantomData,
        }
    }

    /// The descriptor this statement executes.
    #[must_use]
    pub fn query(&self) -> &QueryDescriptor {
        &self.query
    }

    /// The ordinal SQL sent to the engine.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.query.sql
    }

    /// A view of this statement that maps rows into `T`.
    #[must_use]
    pub fn as_type<T: FromRow>(&self) -> Statement<T> {
        Statement::new(Arc::clone(&self.engine), Arc::clone(&self.query))
    }

    fn bind(&self, args: CallArgs, verb: &str) -> Result<Option<Vec<RowValues>>, SqlBindError> {
        let params = resolve(&self.query, args)?;
        tracing::debug!(
            verb,
            sql = %self.query.sql,
            params = params.as_ref().map_or(0, Vec::len),
            "executing statement"
        );
        Ok(params)
    }

    /// Every row, mapped into `R`.
    ///
    /// # Errors
    /// Returns argument resolution errors, engine errors, or `RowMapping` failures.
    pub async fn all(&self, args: impl Into<CallArgs>) -> Result<Vec<R>, SqlBindError> {
        let params = self.bind(args.into(), "all")?;
        let rs = self.engine.query(&self.query.sql, params.as_deref()).await?;
        rs.results.iter().map(R::from_row).collect()
    }

    /// The first row, or `None` when nothing matched.
    ///
    /// # Errors
    /// Returns argument resolution errors, engine errors, or `RowMapping` failures.
    pub async fn one(&self, args: impl Into<CallArgs>) -> Result<Option<R>, SqlBindError> {
        let params = self.bind(args.into(), "one")?;
        let rs = self.engine.query(&self.query.sql, params.as_deref()).await?;
        rs.results.first().map(R::from_row).transpose()
    }

    /// Every row as a positional array.
    ///
    /// # Errors
    /// Returns argument resolution or engine errors.
    pub async fn arrays(
        &self,
        args: impl Into<CallArgs>,
    ) -> Result<Vec<Vec<RowValues>>, SqlBindError> {
        let params = self.bind(args.into(), "arrays")?;
        self.engine
            .query_arrays(&self.query.sql, params.as_deref())
            .await
    }

    /// The first row as a positional array.
    ///
    /// # Errors
    /// Returns argument resolution or engine errors.
    pub async fn array(
        &self,
        args: impl Into<CallArgs>,
    ) -> Result<Option<Vec<RowValues>>, SqlBindError> {
        Ok(self.arrays(args).await?.into_iter().next())
    }

    /// The first field of every row.
    ///
    /// # Errors
    /// Returns argument resolution or engine errors.
    pub async fn column(&self, args: impl Into<CallArgs>) -> Result<Vec<RowValues>, SqlBindError> {
        Ok(self
            .arrays(args)
            .await?
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or(RowValues::Null))
            .collect())
    }

    /// The first field of the first row, `None` when nothing matched.
    ///
    /// # Errors
    /// Returns argument resolution or engine errors.
    pub async fn value(&self, args: impl Into<CallArgs>) -> Result<Option<RowValues>, SqlBindError> {
        Ok(self
            .arrays(args)
            .await?
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next()))
    }

    /// The first field of the first row converted into `T`, `None` when nothing
    /// matched or the field is `NULL`.
    ///
    /// ```rust,no_run
    /// # use sqlbind::prelude::*;
    /// # async fn demo(conn: &Connection) -> Result<(), SqlBindError> {
    /// let stmt = conn.prepare_named("SELECT active FROM users WHERE id = $id", NamedParams::new())?;
    /// let active: Option<bool> = stmt.value_as(params! { "id" => 1 }).await?;
    /// # let _ = active;
    /// # Ok(()) }
    /// ```
    ///
    /// # Errors
    /// Returns argument resolution or engine errors, or `RowMapping` when the field
    /// cannot be converted.
    pub async fn value_as<T: FromValue>(
        &self,
        args: impl Into<CallArgs>,
    ) -> Result<Option<T>, SqlBindError> {
        match self.value(args).await? {
            None | Some(RowValues::Null) => Ok(None),
            Some(value) => T::from_value(value).map(Some),
        }
    }

    /// Run a mutating statement and report the affected rows.
    ///
    /// `last_insert_rowid` is read from the first field of the first returned row, so it
    /// is only populated when the statement carries a `RETURNING` clause.
    ///
    /// # Errors
    /// Returns argument resolution or engine errors.
    pub async fn exec(&self, args: impl Into<CallArgs>) -> Result<Changes, SqlBindError> {
        let params = self.bind(args.into(), "exec")?;
        let outcome = self
            .engine
            .execute(&self.query.sql, params.as_deref())
            .await?;
        let last_insert_rowid = outcome
            .returned
            .first()
            .and_then(|row| row.first())
            .and_then(RowValues::as_int)
            .copied()
            .unwrap_or(0);
        Ok(Changes {
            changes: outcome.rows_affected,
            last_insert_rowid,
        })
    }

    /// Run the statement and discard whatever it returns.
    ///
    /// # Errors
    /// Returns argument resolution or engine errors.
    pub async fn run(&self, args: impl Into<CallArgs>) -> Result<(), SqlBindError> {
        let params = self.bind(args.into(), "run")?;
        self.engine
            .execute(&self.query.sql, params.as_deref())
            .await?;
        Ok(())
    }

    /// # Errors
    /// Always `NotImplemented`: engines bound through this crate are async-only.
    pub fn all_sync(&self, _args: impl Into<CallArgs>) -> Result<Vec<R>, SqlBindError> {
        Err(SqlBindError::not_implemented("all_sync"))
    }

    /// # Errors
    /// Always `NotImplemented`.
    pub fn one_sync(&self, _args: impl Into<CallArgs>) -> Result<Option<R>, SqlBindError> {
        Err(SqlBindError::not_implemented("one_sync"))
    }

    /// # Errors
    /// Always `NotImplemented`.
    pub fn column_sync(&self, _args: impl Into<CallArgs>) -> Result<Vec<RowValues>, SqlBindError> {
        Err(SqlBindError::not_implemented("column_sync"))
    }

    /// # Errors
    /// Always `NotImplemented`.
    pub fn value_sync(
        &self,
        _args: impl Into<CallArgs>,
    ) -> Result<Option<RowValues>, SqlBindError> {
        Err(SqlBindError::not_implemented("value_sync"))
    }

    /// # Errors
    /// Always `NotImplemented`.
    pub fn arrays_sync(
        &self,
        _args: impl Into<CallArgs>,
    ) -> Result<Vec<Vec<RowValues>>, SqlBindError> {
        Err(SqlBindError::not_implemented("arrays_sync"))
    }

    /// # Errors
    /// Always `NotImplemented`.
    pub fn array_sync(
        &self,
        _args: impl Into<CallArgs>,
    ) -> Result<Option<Vec<RowValues>>, SqlBindError> {
        Err(SqlBindError::not_implemented("array_sync"))
    }

    /// # Errors
    /// Always `NotImplemented`.
    pub fn exec_sync(&self, _args: impl Into<CallArgs>) -> Result<Changes, SqlBindError> {
        Err(SqlBindError::not_implemented("exec_sync"))
    }

    /// # Errors
    /// Always `NotImplemented`.
    pub fn run_sync(&self, _args: impl Into<CallArgs>) -> Result<(), SqlBindError> {
        Err(SqlBindError::not_implemented("run_sync"))
    }
}
