//! Database structure reflection.
//!
//! [`DatabaseStructure`] is the read-only view of a database schema that the
//! schema toolkit queries. [`StaticStructure`] is an in-memory
//! implementation built from declared tables, used by snapshot applications
//! and tests.

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A table or view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Whether this is a view.
    #[serde(default)]
    pub view: bool,
}

/// A table column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Database-native type, e.g. `VARCHAR`.
    #[serde(default)]
    pub native_type: Option<String>,
    /// Generic type, used when the native type is unknown.
    #[serde(default, rename = "type")]
    pub generic_type: Option<String>,
    /// Whether NULL is allowed.
    #[serde(default)]
    pub nullable: bool,
    /// Default value.
    #[serde(default)]
    pub default: Option<Value>,
    /// Whether the column auto-increments.
    #[serde(default)]
    pub autoincrement: bool,
}

impl Column {
    /// A non-null column of the given native type.
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: Some(native_type.into()),
            generic_type: None,
            nullable: false,
            default: None,
            autoincrement: false,
        }
    }

    /// Most specific known type name.
    pub fn type_label(&self) -> &str {
        self.native_type
            .as_deref()
            .or(self.generic_type.as_deref())
            .unwrap_or("unknown")
    }
}

/// Primary key of a table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    /// Single-column key.
    Single(String),
    /// Composite key.
    Composite(Vec<String>),
}

impl PrimaryKey {
    /// Whether `column` is part of this key.
    pub fn contains(&self, column: &str) -> bool {
        match self {
            PrimaryKey::Single(name) => name == column,
            PrimaryKey::Composite(names) => names.iter().any(|n| n == column),
        }
    }
}

/// A foreign key pointing from a column of this table to another table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BelongsTo {
    /// Local column.
    pub column: String,
    /// Referenced table.
    pub table: String,
    /// Referenced column, when declared.
    #[serde(default)]
    pub references: Option<String>,
}

/// Reverse of [`BelongsTo`]: another table referencing this one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HasMany {
    /// Referencing table.
    pub table: String,
    /// Referencing columns in that table.
    pub columns: Vec<String>,
}

/// Read-only view of a database schema.
#[async_trait]
pub trait DatabaseStructure: Send + Sync {
    /// All tables and views.
    async fn tables(&self) -> Result<Vec<Table>>;

    /// Columns of `table`; fails with [`Error::TableNotFound`] when absent.
    async fn columns(&self, table: &str) -> Result<Vec<Column>>;

    /// Primary key of `table`, if it has one.
    async fn primary_key(&self, table: &str) -> Result<Option<PrimaryKey>>;

    /// Foreign keys declared on `table`.
    async fn belongs_to(&self, table: &str) -> Result<Vec<BelongsTo>>;

    /// Tables holding foreign keys into `table`.
    async fn has_many(&self, table: &str) -> Result<Vec<HasMany>>;
}

// ============================================================================
// StaticStructure
// ============================================================================

/// Declaration of one table for [`StaticStructure`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Whether this is a view.
    #[serde(default)]
    pub view: bool,
    /// Columns in order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Primary key.
    #[serde(default)]
    pub primary_key: Option<PrimaryKey>,
    /// Foreign keys.
    #[serde(default)]
    pub foreign_keys: Vec<BelongsTo>,
}

impl TableSchema {
    /// A table with the given columns and no keys.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            view: false,
            columns,
            primary_key: None,
            foreign_keys: Vec::new(),
        }
    }

    /// Set a single-column primary key.
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(PrimaryKey::Single(column.into()));
        self
    }

    /// Add a foreign key.
    pub fn with_foreign_key(
        mut self,
        column: impl Into<String>,
        table: impl Into<String>,
        references: Option<&str>,
    ) -> Self {
        self.foreign_keys.push(BelongsTo {
            column: column.into(),
            table: table.into(),
            references: references.map(str::to_string),
        });
        self
    }
}

/// In-memory [`DatabaseStructure`].
#[derive(Clone, Debug, Default)]
pub struct StaticStructure {
    tables: Vec<TableSchema>,
}

impl StaticStructure {
    /// Create a structure from table declarations.
    pub fn new(tables: Vec<TableSchema>) -> Self {
        Self { tables }
    }

    fn table(&self, name: &str) -> Result<&TableSchema> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }
}

#[async_trait]
impl DatabaseStructure for StaticStructure {
    async fn tables(&self) -> Result<Vec<Table>> {
        Ok(self
            .tables
            .iter()
            .map(|t| Table {
                name: t.name.clone(),
                view: t.view,
            })
            .collect())
    }

    async fn columns(&self, table: &str) -> Result<Vec<Column>> {
        Ok(self.table(table)?.columns.clone())
    }

    async fn primary_key(&self, table: &str) -> Result<Option<PrimaryKey>> {
        Ok(self.table(table)?.primary_key.clone())
    }

    async fn belongs_to(&self, table: &str) -> Result<Vec<BelongsTo>> {
        Ok(self.table(table)?.foreign_keys.clone())
    }

    async fn has_many(&self, table: &str) -> Result<Vec<HasMany>> {
        self.table(table)?;

        let mut result: Vec<HasMany> = Vec::new();
        for source in &self.tables {
            let columns: Vec<String> = source
                .foreign_keys
                .iter()
                .filter(|fk| fk.table == table)
                .map(|fk| fk.column.clone())
                .collect();
            if !columns.is_empty() {
                result.push(HasMany {
                    table: source.name.clone(),
                    columns,
                });
            }
        }
        Ok(result)
    }
}
