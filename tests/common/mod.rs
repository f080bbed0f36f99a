#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlbind::prelude::*;
use sqlbind::{Engine, ExecOutcome};

#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: Option<i64>,
    pub first_name: String,
    pub email: Option<String>,
}

impl Contact {
    pub fn new(first_name: &str, email: Option<&str>) -> Self {
        Self {
            id: None,
            first_name: first_name.to_string(),
            email: email.map(str::to_string),
        }
    }
}

impl FromRow for Contact {
    fn from_row(row: &CustomDbRow) -> Result<Self, SqlBindError> {
        Ok(Self {
            id: row.try_get("id")?.as_int().copied(),
            first_name: row
                .try_get("firstName")?
                .as_text()
                .ok_or_else(|| SqlBindError::RowMapping("firstName is not text".into()))?
                .to_string(),
            email: row.try_get("email")?.as_text().map(str::to_string),
        })
    }
}

impl Model for Contact {
    fn table() -> TableDef {
        TableDef::new(
            "Contact",
            vec![
                ColumnDef::new("id", ColumnType::Integer).auto_increment(),
                ColumnDef::new("firstName", ColumnType::Text),
                ColumnDef::new("email", ColumnType::Text).nullable(),
            ],
        )
    }

    fn to_params(&self) -> NamedParams {
        params! {
            "id" => self.id,
            "firstName" => &self.first_name,
            "email" => self.email.clone(),
        }
    }
}

/// A call the mock engine received.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub sql: String,
    pub params: Option<Vec<RowValues>>,
}

/// Engine that records every call and answers with canned rows.
#[derive(Debug, Default)]
pub struct MockEngine {
    pub calls: Mutex<Vec<Recorded>>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RowValues>>,
    pub rows_affected: u64,
}

impl MockEngine {
    pub fn returning(columns: &[&str], rows: Vec<Vec<RowValues>>) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
            ..Self::default()
        }
    }

    pub fn affecting(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: Option<&[RowValues]>) {
        self.calls.lock().unwrap().push(Recorded {
            sql: sql.to_string(),
            params: params.map(<[RowValues]>::to_vec),
        });
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Custom
    }

    async fn query(
        &self,
        sql: &str,
        params: Option<&[RowValues]>,
    ) -> Result<ResultSet, SqlBindError> {
        self.record(sql, params);
        let mut rs = ResultSet::with_capacity(self.rows.len());
        rs.set_column_names(Arc::new(self.columns.clone()));
        for row in &self.rows {
            rs.add_row_values(row.clone());
        }
        Ok(rs)
    }

    async fn execute(
        &self,
        sql: &str,
        params: Option<&[RowValues]>,
    ) -> Result<ExecOutcome, SqlBindError> {
        self.record(sql, params);
        Ok(ExecOutcome {
            rows_affected: self.rows_affected,
            returned: self.rows.clone(),
        })
    }

    async fn close(&self) -> Result<(), SqlBindError> {
        Ok(())
    }
}

pub fn mock_connection(engine: Arc<MockEngine>) -> Connection {
    Connection::with_config(engine, SchemaConfig::new(Dialect::Postgres))
}
