// PostgreSQL engine:
// - config: options, validation and connection setup
// - params: `RowValues` as tokio-postgres parameters
// - query: row extraction
// - engine: the async `Engine` implementation

pub mod config;
pub mod engine;
pub mod params;
pub mod query;

pub use config::{PostgresOptions, PostgresOptionsBuilder};
pub use engine::PostgresEngine;
