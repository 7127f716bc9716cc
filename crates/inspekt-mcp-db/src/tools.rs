//! MCP tools for database schema introspection.
//!
//! Provides `DbToolkit`, which delegates to the application's
//! [`DatabaseStructure`] to describe tables, columns and foreign keys.

use inspekt_core::database::{BelongsTo, PrimaryKey};
use inspekt_core::snapshot::DATABASE_SERVICE;
use inspekt_core::{ApplicationBridge, DatabaseStructure};
use inspekt_mcp::{
    Availability, ToolDefinition, ToolError, Toolkit, domain_error, serialize_response,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Shared handle type the toolkit pulls from the container.
pub type SharedStructure = Arc<dyn DatabaseStructure>;

// ---------------------------------------------------------------------------
// Argument types
// ---------------------------------------------------------------------------

/// Arguments for tools without parameters.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoArgs {}

/// Arguments for tools taking a table name.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TableArgs {
    /// The exact table name as it exists in the database
    pub table: String,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A table or view.
#[derive(Clone, Debug, Serialize)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// Whether this is a view.
    pub view: bool,
}

/// Response from `db_get_tables`.
#[derive(Clone, Debug, Serialize)]
pub struct TablesResponse {
    /// Tables and views.
    pub tables: Vec<TableInfo>,
    /// Number of tables and views.
    pub count: usize,
}

/// Target of a foreign key.
#[derive(Clone, Debug, Serialize)]
pub struct ForeignKeyInfo {
    /// Referenced table.
    pub table: String,
    /// Referenced column(s); `null` when unknown.
    pub column: Value,
}

/// A column of a table.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Native type, else generic type, else `unknown`.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Default value.
    pub default: Option<Value>,
    /// Whether the column is part of the primary key.
    pub primary: bool,
    /// Whether the column auto-increments.
    pub autoincrement: bool,
    /// Foreign key, when the column has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKeyInfo>,
}

/// Response from `db_get_columns`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsResponse {
    /// Table name.
    pub table: String,
    /// Columns in order.
    pub columns: Vec<ColumnInfo>,
    /// Primary key column or columns.
    pub primary_key: Option<PrimaryKey>,
}

/// A table end of a relationship.
#[derive(Clone, Debug, Serialize)]
pub struct TableEnd {
    /// Table name.
    pub table: String,
}

/// A column end of a relationship.
#[derive(Clone, Debug, Serialize)]
pub struct ColumnEnd {
    /// Table name.
    pub table: String,
    /// Column(s); `null` when unknown.
    pub column: Value,
}

/// A relationship between two tables.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Relationship {
    /// A foreign key on `from` pointing at `to`.
    BelongsTo {
        /// Referencing column.
        from: ColumnEnd,
        /// Referenced column.
        to: ColumnEnd,
    },
    /// Rows of `to` referencing `from`.
    HasMany {
        /// Referenced table.
        from: TableEnd,
        /// Referencing column.
        to: ColumnEnd,
    },
}

/// Response from `db_get_relationships`.
#[derive(Clone, Debug, Serialize)]
pub struct RelationshipsResponse {
    /// All relationships, grouped by table.
    pub relationships: Vec<Relationship>,
    /// Number of relationships.
    pub count: usize,
}

// ---------------------------------------------------------------------------
// DbToolkit
// ---------------------------------------------------------------------------

/// MCP tools over the application's database structure.
///
/// Generates four tools:
/// - `db_get_tables`: tables and views
/// - `db_get_columns`: columns of one table
/// - `db_get_relationships`: belongs-to and has-many references
/// - `db_suggest_entity`: entity class suggestion (not implemented)
#[derive(Clone)]
pub struct DbToolkit {
    structure: SharedStructure,
}

impl DbToolkit {
    /// Create the toolkit over a database structure.
    pub fn new(structure: SharedStructure) -> Self {
        Self { structure }
    }

    /// Create the toolkit if the container provides a database structure.
    ///
    /// The conventional service name is tried first, then the single
    /// autowired structure.
    pub fn try_create(bridge: &ApplicationBridge) -> Availability<Self> {
        let container = match bridge.container() {
            Ok(container) => container,
            Err(e) => return Availability::Absent(format!("container unavailable: {e}")),
        };

        let structure = if container.has_service(DATABASE_SERVICE) {
            container.get_service::<SharedStructure>(DATABASE_SERVICE)
        } else {
            container.get_by_type::<SharedStructure>()
        };

        match structure {
            Ok(structure) => Availability::Available(Self::new(structure)),
            Err(e) => Availability::Absent(format!("no database structure: {e}")),
        }
    }

    /// All tables and views.
    pub async fn tables(&self) -> Result<TablesResponse, ToolError> {
        let tables: Vec<TableInfo> = self
            .structure
            .tables()
            .await?
            .into_iter()
            .map(|t| TableInfo {
                name: t.name,
                view: t.view,
            })
            .collect();

        Ok(TablesResponse {
            count: tables.len(),
            tables,
        })
    }

    /// Columns of `table`, or the payload for a missing table.
    pub async fn columns(&self, table: &str) -> Result<Value, ToolError> {
        let columns = match self.structure.columns(table).await {
            Ok(columns) => columns,
            Err(e) => return Ok(domain_error(format!("Table '{table}' not found: {e}"))),
        };

        let primary_key = self.structure.primary_key(table).await?;
        let foreign_keys = self.structure.belongs_to(table).await?;

        let mut result = Vec::with_capacity(columns.len());
        for column in columns {
            let foreign_key = match foreign_keys.iter().find(|fk| fk.column == column.name) {
                Some(fk) => Some(ForeignKeyInfo {
                    table: fk.table.clone(),
                    column: self.referenced_column(fk).await,
                }),
                None => None,
            };

            result.push(ColumnInfo {
                type_name: column.type_label().to_string(),
                primary: primary_key.as_ref().is_some_and(|pk| pk.contains(&column.name)),
                name: column.name,
                nullable: column.nullable,
                default: column.default,
                autoincrement: column.autoincrement,
                foreign_key,
            });
        }

        serialize_response(&ColumnsResponse {
            table: table.to_string(),
            columns: result,
            primary_key,
        })
    }

    /// Every foreign key, seen from both ends.
    pub async fn relationships(&self) -> Result<RelationshipsResponse, ToolError> {
        let mut relationships = Vec::new();

        for table in self.structure.tables().await? {
            for fk in self.structure.belongs_to(&table.name).await? {
                relationships.push(Relationship::BelongsTo {
                    to: ColumnEnd {
                        table: fk.table.clone(),
                        column: self.referenced_column(&fk).await,
                    },
                    from: ColumnEnd {
                        table: table.name.clone(),
                        column: Value::String(fk.column),
                    },
                });
            }

            for reference in self.structure.has_many(&table.name).await? {
                for column in reference.columns {
                    relationships.push(Relationship::HasMany {
                        from: TableEnd {
                            table: table.name.clone(),
                        },
                        to: ColumnEnd {
                            table: reference.table.clone(),
                            column: Value::String(column),
                        },
                    });
                }
            }
        }

        Ok(RelationshipsResponse {
            count: relationships.len(),
            relationships,
        })
    }

    // Declared target column, else the referenced table's primary key.
    async fn referenced_column(&self, fk: &BelongsTo) -> Value {
        if let Some(column) = &fk.references {
            return Value::String(column.clone());
        }
        match self.structure.primary_key(&fk.table).await {
            Ok(Some(PrimaryKey::Single(column))) => Value::String(column),
            Ok(Some(PrimaryKey::Composite(columns))) => {
                Value::Array(columns.into_iter().map(Value::String).collect())
            }
            Ok(None) | Err(_) => Value::Null,
        }
    }
}

impl Toolkit for DbToolkit {
    fn name(&self) -> &str {
        "db"
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        let tables = self.clone();
        let columns = self.clone();
        let relationships = self.clone();

        vec![
            ToolDefinition::typed(
                "db_get_tables",
                "List all database tables and views with their names",
                move |_: NoArgs| {
                    let toolkit = tables.clone();
                    async move { serialize_response(&toolkit.tables().await?) }
                },
            )
            .read_only(),
            ToolDefinition::typed(
                "db_get_columns",
                "Get columns of a specific table with types, nullable, defaults, and foreign keys",
                move |args: TableArgs| {
                    let toolkit = columns.clone();
                    async move { toolkit.columns(&args.table).await }
                },
            )
            .read_only(),
            ToolDefinition::typed(
                "db_get_relationships",
                "Get all foreign key relationships between tables (belongsTo and hasMany)",
                move |_: NoArgs| {
                    let toolkit = relationships.clone();
                    async move { serialize_response(&toolkit.relationships().await?) }
                },
            )
            .read_only(),
            ToolDefinition::typed(
                "db_suggest_entity",
                "Generate a suggested entity class with typed properties for a table",
                |_: TableArgs| async { Ok(domain_error("Not yet implemented")) },
            )
            .read_only(),
        ]
    }
}

impl std::fmt::Debug for DbToolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbToolkit").finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
