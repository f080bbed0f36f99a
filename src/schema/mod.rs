//! SQL text generation for mapped model types.
//!
//! The connection never builds statement text itself: it asks a [`Schema`] for SQL that
//! uses `$prop` named placeholders and binds the model's flat parameter bag against it.

mod naming;
mod table;

use std::fmt;

pub use naming::{Dialect, NamingStrategy, SchemaConfig};
pub use table::{ColumnDef, ColumnType, Model, TableDef};

use crate::types::NamedParams;

/// Contract of the schema/SQL-builder collaborator.
pub trait Schema: Send + Sync + fmt::Debug {
    fn config(&self) -> &SchemaConfig;

    /// Quote an identifier for the target dialect.
    fn quote(&self, symbol: &str) -> String {
        format!("\"{}\"", symbol.replace('"', "\"\""))
    }

    fn table_name(&self, table: &TableDef) -> String {
        self.quote(&self.config().naming.table_name(&table.name))
    }

    fn column_name(&self, column: &ColumnDef) -> String {
        match &column.alias {
            Some(alias) => self.quote(alias),
            None => self.quote(&self.config().naming.column_name(&column.prop)),
        }
    }

    /// `INSERT` for the given props, or for every non-generated column.
    fn insert(&self, table: &TableDef, only: Option<&[String]>) -> String;

    /// `UPDATE` of the non-key columns (restricted to `only`), targeted by primary key.
    fn update(&self, table: &TableDef, only: Option<&[String]>) -> String;

    /// `DELETE` targeted by primary key.
    fn delete(&self, table: &TableDef) -> String;

    fn create_table(&self, table: &TableDef) -> String;

    fn drop_table(&self, table: &TableDef) -> String;

    /// A query returning one table name per row.
    fn table_names(&self) -> String;

    /// Restrict a model's parameter bag to mapped columns, and to `only` when given.
    fn to_db_object(
        &self,
        table: &TableDef,
        params: NamedParams,
        only: Option<&[String]>,
    ) -> NamedParams {
        params
            .into_iter()
            .filter(|(prop, _)| table.column(prop).is_some())
            .filter(|(prop, _)| only.is_none_or(|only| only.iter().any(|p| p == prop)))
            .collect()
    }
}

/// Default [`Schema`] producing `PostgreSQL` or `SQLite` flavored SQL.
#[derive(Debug, Clone, Default)]
pub struct DialectSchema {
    config: SchemaConfig,
}

impl DialectSchema {
    #[must_use]
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }

    fn column_type(&self, column: &ColumnDef) -> &'static str {
        match (self.config.dialect, column.column_type) {
            (Dialect::Postgres, ColumnType::Integer) if column.auto_increment => "SERIAL",
            (Dialect::Postgres, ColumnType::BigInt) if column.auto_increment => "BIGSERIAL",
            (Dialect::Postgres, ColumnType::Integer) => "INTEGER",
            (Dialect::Postgres, ColumnType::BigInt) => "BIGINT",
            (Dialect::Postgres, ColumnType::Real) => "DOUBLE PRECISION",
            (Dialect::Postgres, ColumnType::Text) => "TEXT",
            (Dialect::Postgres, ColumnType::Boolean) => "BOOLEAN",
            (Dialect::Postgres, ColumnType::Timestamp) => "TIMESTAMP",
            (Dialect::Postgres, ColumnType::Json) => "JSONB",
            (Dialect::Postgres, ColumnType::Blob) => "BYTEA",
            (Dialect::Sqlite, ColumnType::Integer | ColumnType::BigInt | ColumnType::Boolean) => {
                "INTEGER"
            }
            (Dialect::Sqlite, ColumnType::Real) => "REAL",
            (Dialect::Sqlite, ColumnType::Text | ColumnType::Timestamp | ColumnType::Json) => {
                "TEXT"
            }
            (Dialect::Sqlite, ColumnType::Blob) => "BLOB",
        }
    }

    fn column_definition(&self, column: &ColumnDef, inline_pk: bool) -> String {
        let mut sql = format!("{} {}", self.column_name(column), self.column_type(column));
        if inline_pk && column.primary_key {
            sql.push_str(" PRIMARY KEY");
            if column.auto_increment && self.config.dialect == Dialect::Sqlite {
                sql.push_str(" AUTOINCREMENT");
            }
        } else if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }

    fn assignments<'a>(&self, columns: impl Iterator<Item = &'a ColumnDef>) -> Vec<String> {
        columns
            .map(|c| format!("{} = ${}", self.column_name(c), c.prop))
            .collect()
    }

    fn primary_key_filter(&self, table: &TableDef) -> String {
        self.assignments(table.primary_keys()).join(" AND ")
    }
}

fn is_selected(only: Option<&[String]>, column: &ColumnDef) -> bool {
    only.is_none_or(|only| only.iter().any(|p| *p == column.prop))
}

impl Schema for DialectSchema {
    fn config(&self) -> &SchemaConfig {
        &self.config
    }

    fn insert(&self, table: &TableDef, only: Option<&[String]>) -> String {
        let columns: Vec<&ColumnDef> = match only {
            Some(_) => table
                .columns
                .iter()
                .filter(|c| is_selected(only, c))
                .collect(),
            None => table.columns.iter().filter(|c| !c.auto_increment).collect(),
        };
        if columns.is_empty() {
            return format!("INSERT INTO {} DEFAULT VALUES", self.table_name(table));
        }
        let names: Vec<String> = columns.iter().map(|c| self.column_name(c)).collect();
        let values: Vec<String> = columns.iter().map(|c| format!("${}", c.prop)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table_name(table),
            names.join(", "),
            values.join(", ")
        )
    }

    fn update(&self, table: &TableDef, only: Option<&[String]>) -> String {
        let set = self.assignments(
            table
                .columns
                .iter()
                .filter(|c| !c.primary_key && is_selected(only, c)),
        );
        format!(
            "UPDATE {} SET {} WHERE {}",
            self.table_name(table),
            set.join(", "),
            self.primary_key_filter(table)
        )
    }

    fn delete(&self, table: &TableDef) -> String {
        format!(
            "DELETE FROM {} WHERE {}",
            self.table_name(table),
            self.primary_key_filter(table)
        )
    }

    fn create_table(&self, table: &TableDef) -> String {
        let pk_count = table.primary_keys().count();
        let mut defs: Vec<String> = table
            .columns
            .iter()
            .map(|c| self.column_definition(c, pk_count == 1))
            .collect();
        if pk_count > 1 {
            let keys: Vec<String> = table.primary_keys().map(|c| self.column_name(c)).collect();
            defs.push(format!("PRIMARY KEY ({})", keys.join(", ")));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            self.table_name(table),
            defs.join(",\n  ")
        )
    }

    fn drop_table(&self, table: &TableDef) -> String {
        format!("DROP TABLE IF EXISTS {}", self.table_name(table))
    }

    fn table_names(&self) -> String {
        match self.config.dialect {
            Dialect::Postgres => "SELECT table_name::text FROM information_schema.tables \
                 WHERE table_schema = current_schema() ORDER BY table_name"
                .to_string(),
            Dialect::Sqlite => "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    fn contact() -> TableDef {
        TableDef::new(
            "Contact",
            vec![
                ColumnDef::new("id", ColumnType::Integer).auto_increment(),
                ColumnDef::new("firstName", ColumnType::Text),
                ColumnDef::new("email", ColumnType::Text).nullable(),
            ],
        )
    }

    #[test]
    fn insert_skips_generated_key() {
        let schema = DialectSchema::default();
        assert_eq!(
            schema.insert(&contact(), None),
            r#"INSERT INTO "Contact" ("firstName", "email") VALUES ($firstName, $email)"#
        );
    }

    #[test]
    fn update_restricted_to_props() {
        let schema = DialectSchema::new(
            SchemaConfig::new(Dialect::Postgres).with_naming(NamingStrategy::SnakeCase),
        );
        let only = vec!["email".to_string(), "id".to_string()];
        assert_eq!(
            schema.update(&contact(), Some(&only)),
            r#"UPDATE "contact" SET "email" = $email WHERE "id" = $id"#
        );
    }

    #[test]
    fn create_table_per_dialect() {
        let pg = DialectSchema::new(SchemaConfig::new(Dialect::Postgres));
        assert_eq!(
            pg.create_table(&contact()),
            "CREATE TABLE IF NOT EXISTS \"Contact\" (\n  \"id\" SERIAL PRIMARY KEY,\n  \"firstName\" TEXT NOT NULL,\n  \"email\" TEXT\n)"
        );
        let lite = DialectSchema::new(SchemaConfig::new(Dialect::Sqlite));
        assert!(
            lite.create_table(&contact())
                .contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT")
        );
    }

    #[test]
    fn db_object_drops_unmapped_and_unselected_props() {
        let schema = DialectSchema::default();
        let bag = params! { "id" => 1, "firstName" => "John", "email" => "j@x", "extra" => true };
        let only = vec!["email".to_string()];
        let obj = schema.to_db_object(&contact(), bag, Some(&only));
        assert_eq!(obj, params! { "email" => "j@x" });
    }

    #[test]
    fn quotes_embedded_quotes() {
        assert_eq!(DialectSchema::default().quote("a\"b"), "\"a\"\"b\"");
    }
}
