//! Database schema introspection MCP tools for Inspekt.
//!
//! This crate provides MCP tools that delegate to an
//! `inspekt_core::DatabaseStructure` found in the application's container.
//!
//! # Tools
//!
//! - `db_get_tables`: tables and views
//! - `db_get_columns`: column types, nullability, defaults and foreign keys
//! - `db_get_relationships`: belongs-to and has-many references
//! - `db_suggest_entity`: placeholder, always answers "Not yet implemented"

pub mod tools;

// Re-exports
pub use tools::{
    ColumnInfo, ColumnsResponse, DbToolkit, Relationship, RelationshipsResponse, SharedStructure,
    TableArgs, TableInfo, TablesResponse,
};
