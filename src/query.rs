use std::fmt::{self, Write};
use std::marker::PhantomData;

use crate::error::SqlBindError;
use crate::results::{CustomDbRow, FromRow};
use crate::types::{NamedParams, RowValues};

/// Literal SQL segments interleaved with interpolated values.
///
/// Rendering appends `$1..$N` after each segment that is followed by a value, so
/// values are always bound positionally and never go through the named rewrite.
/// There is always exactly one more segment than there are values.
/// The [`sql!`](crate::sql) macro builds one from a `{}` format string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlTemplate {
    segments: Vec<String>,
    values: Vec<RowValues>,
}

impl SqlTemplate {
    /// # Errors
    /// Returns `SqlBindError::InvalidParameters` unless `segments` holds exactly one
    /// more entry than `values`.
    pub fn new(segments: Vec<String>, values: Vec<RowValues>) -> Result<Self, SqlBindError> {
        if segments.len() != values.len() + 1 {
            return Err(SqlBindError::InvalidParameters {
                supplied: "template",
                sql: segments.join("{}"),
            });
        }
        Ok(Self { segments, values })
    }

    /// Segments and values already known to line up, as the `sql!` macro produces.
    #[doc(hidden)]
    #[must_use]
    pub fn from_checked(segments: Vec<String>, values: Vec<RowValues>) -> Self {
        debug_assert_eq!(segments.len(), values.len() + 1);
        Self { segments, values }
    }

    /// Start a template with a leading literal segment.
    #[must_use]
    pub fn literal(segment: impl Into<String>) -> Self {
        Self {
            segments: vec![segment.into()],
            values: Vec::new(),
        }
    }

    /// Interpolate a value after the current segment.
    #[must_use]
    pub fn bind(mut self, value: impl Into<RowValues>) -> Self {
        if self.segments.is_empty() {
            self.segments.push(String::new());
        }
        self.values.push(value.into());
        self.segments.push(String::new());
        self
    }

    /// Append literal text to the trailing segment.
    #[must_use]
    pub fn push(mut self, text: &str) -> Self {
        match self.segments.last_mut() {
            Some(last) => last.push_str(text),
            None => self.segments.push(text.to_string()),
        }
        self
    }

    #[must_use]
    pub fn values(&self) -> &[RowValues] {
        &self.values
    }

    /// The ordinal SQL text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut sql = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            sql.push_str(segment);
            if i < self.values.len() {
                let _ = write!(sql, "${}", i + 1);
            }
        }
        sql
    }

    #[must_use]
    pub fn into_parts(self) -> (String, Vec<RowValues>) {
        let sql = self.render();
        (sql, self.values)
    }
}

/// Number of `{}` slots in an `sql!` format string. `{{` and `}}` are literal braces.
///
/// Evaluated at compile time by the macro; a lone brace fails the build.
#[doc(hidden)]
#[must_use]
pub const fn template_slots(fmt: &str) -> usize {
    let bytes = fmt.as_bytes();
    let mut idx = 0;
    let mut slots = 0;
    while idx < bytes.len() {
        let next = if idx + 1 < bytes.len() { bytes[idx + 1] } else { 0 };
        match (bytes[idx], next) {
            (b'{', b'{') | (b'}', b'}') => idx += 2,
            (b'{', b'}') => {
                slots += 1;
                idx += 2;
            }
            (b'{' | b'}', _) => panic!("sql!: unmatched brace in template"),
            _ => idx += 1,
        }
    }
    slots
}

/// Literal segments of an `sql!` format string, with `{{`/`}}` unescaped.
#[doc(hidden)]
#[must_use]
pub fn template_segments(fmt: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = fmt.chars().peekable();
    while let Some(ch) = chars.next() {
        match (ch, chars.peek()) {
            ('{', Some('{')) | ('}', Some('}')) => {
                chars.next();
                current.push(ch);
            }
            ('{', Some('}')) => {
                chars.next();
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    segments.push(current);
    segments
}

/// Build a [`Query`] from a format string whose `{}` slots become `$1..$N`.
///
/// The slot count is checked against the values at compile time. Write `{{` and `}}`
/// for literal braces, as in `format!`.
///
/// ```rust
/// use sqlbind::sql;
///
/// let id = 7;
/// let query = sql!("SELECT '{{}}'::jsonb FROM users WHERE id = {} AND active = {}", id, true);
/// # let _ = query;
/// ```
///
/// ```compile_fail
/// let query = sqlbind::sql!("SELECT * FROM users WHERE id = {}", 1, 2);
/// ```
#[macro_export]
macro_rules! sql {
    ($fmt:literal $(, $value:expr)* $(,)?) => {{
        const {
            assert!(
                $crate::query::template_slots($fmt) == 0usize $(+ { let _ = stringify!($value); 1usize })*,
                "sql!: slot count does not match the number of values"
            );
        }
        $crate::Query::template($crate::SqlTemplate::from_checked(
            $crate::query::template_segments($fmt),
            vec![$($crate::RowValues::from($value)),*],
        ))
    }};
}

/// SQL text and named parameters produced by a query-builder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub sql: String,
    pub params: NamedParams,
}

impl Fragment {
    #[must_use]
    pub fn new(sql: impl Into<String>, params: NamedParams) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// An external query builder whose output can be executed by a connection.
///
/// `Into` is the row type the builder selects into; builders without one use
/// [`CustomDbRow`].
pub trait SqlBuilder {
    type Into: FromRow;

    fn build(&self) -> Fragment;
}

impl SqlBuilder for Fragment {
    type Into = CustomDbRow;

    fn build(&self) -> Fragment {
        self.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum QuerySource {
    Template(SqlTemplate),
    Named { sql: String, params: NamedParams },
    /// SQL executed without any argument.
    Raw(String),
}

/// SQL submitted to a connection, in any of the supported calling conventions, plus
/// the type returned rows are mapped into.
pub struct Query<R = CustomDbRow> {
    pub(crate) source: QuerySource,
    _into: PhantomData<fn() -> R>,
}

impl<R> Clone for Query<R> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            _into: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Query<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("source", &self.source)
            .field("into", &std::any::type_name::<R>())
            .finish()
    }
}

impl Query<CustomDbRow> {
    /// Positional SQL from a template; bypasses the named rewrite.
    #[must_use]
    pub fn template(template: SqlTemplate) -> Self {
        Self::from_source(QuerySource::Template(template))
    }

    /// SQL with `$name` placeholders bound from `params`.
    #[must_use]
    pub fn named(sql: impl Into<String>, params: NamedParams) -> Self {
        Self::from_source(QuerySource::Named {
            sql: sql.into(),
            params,
        })
    }

    /// SQL executed without an argument.
    ///
    /// Unlike [`Query::named`] with an empty bag, no keyed bag is supplied at
    /// execution, so `$name` placeholders are only accepted when there is at most one.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::from_source(QuerySource::Raw(sql.into()))
    }
}

impl<R: FromRow> Query<R> {
    fn from_source(source: QuerySource) -> Self {
        Self {
            source,
            _into: PhantomData,
        }
    }

    /// Output of a query-builder, selecting into the builder's row type.
    #[must_use]
    pub fn builder<B: SqlBuilder<Into = R>>(builder: &B) -> Self {
        let Fragment { sql, params } = builder.build();
        Self::from_source(QuerySource::Named { sql, params })
    }

    /// Map returned rows into `T` instead.
    #[must_use]
    pub fn into_type<T: FromRow>(self) -> Query<T> {
        Query::from_source(self.source)
    }
}

impl From<SqlTemplate> for Query {
    fn from(template: SqlTemplate) -> Self {
        Query::template(template)
    }
}

impl From<Fragment> for Query {
    fn from(fragment: Fragment) -> Self {
        Query::named(fragment.sql, fragment.params)
    }
}
