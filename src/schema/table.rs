use crate::results::FromRow;
use crate::types::NamedParams;

/// Storage type of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInt,
    Real,
    Text,
    Boolean,
    Timestamp,
    Json,
    Blob,
}

/// One mapped property of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Property name, also the `$name` placeholder bound for this column.
    pub prop: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub nullable: bool,
    /// Explicit column name, bypassing the naming strategy.
    pub alias: Option<String>,
}

impl ColumnDef {
    #[must_use]
    pub fn new(prop: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            prop: prop.into(),
            column_type,
            primary_key: false,
            auto_increment: false,
            nullable: false,
            alias: None,
        }
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the column as a generated primary key.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.primary_key = true;
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.alias = Some(name.into());
        self
    }
}

/// Table metadata for a model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    #[must_use]
    pub fn auto_increment_column(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.auto_increment)
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    #[must_use]
    pub fn primary_key_props(&self) -> Vec<String> {
        self.primary_keys().map(|c| c.prop.clone()).collect()
    }

    #[must_use]
    pub fn column(&self, prop: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.prop == prop)
    }
}

/// A type stored as one row of a table.
pub trait Model: FromRow + Sync {
    fn table() -> TableDef;

    /// The row as a flat bag keyed by property name.
    fn to_params(&self) -> NamedParams;
}
