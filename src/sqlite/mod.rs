// SQLite engine, split the same way as the Postgres one:
// - config: options and connection setup
// - params: conversion from `RowValues` to rusqlite values
// - query: row extraction and statement execution
// - engine: the async `Engine` implementation

pub mod config;
pub mod engine;
pub mod params;
pub mod query;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use engine::SqliteEngine;
