//! Common test utilities for inspekt-server integration tests.

use inspekt_core::{Application, BootstrapCatalog, BootstrapContext, Container, DefinitionGraph};
use inspekt_mcp::{ToolDefinition, ToolError, Toolkit};
use inspekt_mcp_db::TableArgs;
use inspekt_server::{ServerAssembly, Serving, ToolkitCatalog};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A shop with services, two related tables and three routes.
pub const SHOP: &str = r#"{
    "services": [
        {"name": "articles", "type": "App\\Model\\ArticleFacade", "tags": {"api": true}},
        {"name": "mailer", "type": "Mail\\Mailer"}
    ],
    "database": {
        "tables": [
            {
                "name": "author",
                "columns": [{"name": "id", "nativeType": "INT"}],
                "primaryKey": "id"
            },
            {
                "name": "article",
                "columns": [
                    {"name": "id", "nativeType": "INT"},
                    {"name": "author_id", "nativeType": "INT"}
                ],
                "primaryKey": "id",
                "foreignKeys": [{"column": "author_id", "table": "author"}]
            }
        ]
    },
    "router": {
        "routes": [
            {"mask": "article/<id \\d+>", "destination": "Article:show"},
            {"mask": "<presenter>/<action>", "destination": "Homepage:default"}
        ]
    }
}"#;

/// A site directory holding the configuration and the entry point.
pub struct Site {
    dir: TempDir,
}

impl Site {
    /// Creates an empty site.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Writes the entry point at the default location.
    pub fn with_snapshot(self, content: &str) -> Self {
        fs::create_dir_all(self.dir.path().join("app")).unwrap();
        fs::write(self.dir.path().join("app/inspekt.json"), content).unwrap();
        self
    }

    /// Writes `mcp-config.toml`.
    pub fn with_config(self, content: &str) -> Self {
        fs::write(self.dir.path().join("mcp-config.toml"), content).unwrap();
        self
    }

    /// Site directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Assembly rooted at this site, with the test bootstraps and toolkits.
    pub fn assembly(&self) -> ServerAssembly {
        ServerAssembly::new()
            .with_base_dir(self.path())
            .with_bootstraps(bootstraps())
            .with_toolkits(toolkits())
    }

    /// Assembles the server, panicking on failure.
    pub fn serving(&self) -> Serving {
        inspekt_server::assemble(self.assembly()).unwrap()
    }
}

impl Default for Site {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Bootstraps
// ============================================================================

/// Describes its services but cannot build a container.
struct ServicesOnly;

impl Application for ServicesOnly {
    fn definition_graph(&self) -> inspekt_core::Result<DefinitionGraph> {
        Ok(DefinitionGraph::default())
    }

    fn create_container(&self) -> inspekt_core::Result<Container> {
        Err(inspekt_core::Error::bootstrap("container compilation failed"))
    }
}

fn services_only(_: &BootstrapContext) -> inspekt_core::Result<Box<dyn Application>> {
    Ok(Box::new(ServicesOnly))
}

/// Default bootstraps plus `services-only`.
pub fn bootstraps() -> BootstrapCatalog {
    BootstrapCatalog::default().register("services-only", services_only)
}

// ============================================================================
// Toolkits
// ============================================================================

/// Counts rows; needs a container to exist.
struct Audit;

impl Toolkit for Audit {
    fn name(&self) -> &str {
        "audit"
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::typed(
                "audit_row_count",
                "Count rows in a table",
                |args: TableArgs| async move {
                    if args.table == "locked" {
                        return Err(ToolError::failed("table is locked"));
                    }
                    Ok(json!({ "table": args.table, "rows": 0 }))
                },
            )
            .read_only(),
        ]
    }
}

/// Registers a tool under a built-in name.
struct Shadow;

impl Toolkit for Shadow {
    fn name(&self) -> &str {
        "shadow"
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition::typed(
            "db_get_tables",
            "Replacement table listing",
            |_: Map<String, Value>| async { Ok(json!({ "shadowed": true })) },
        )]
    }
}

/// `audit` (needs a container) and `shadow`.
pub fn toolkits() -> ToolkitCatalog {
    ToolkitCatalog::new()
        .register("audit", |bridge| {
            bridge.container()?;
            Ok(Box::new(Audit) as Box<dyn Toolkit>)
        })
        .register("shadow", |_| Ok(Box::new(Shadow) as Box<dyn Toolkit>))
}

// ============================================================================
// Calls
// ============================================================================

/// A `tools/call` request line.
pub fn call_request(id: u64, tool: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": tool, "arguments": arguments}
    })
}

/// The JSON payload carried in a `tools/call` response.
pub fn payload(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

/// Sends one message and returns the reply as JSON.
pub async fn exchange(serving: &Serving, request: &Value) -> Value {
    let reply = serving.server().handle_text(&request.to_string()).await.unwrap();
    serde_json::to_value(reply).unwrap()
}

/// Calls `tool` and returns its payload.
pub async fn call(serving: &Serving, tool: &str, arguments: Value) -> Value {
    let response = exchange(serving, &call_request(1, tool, arguments)).await;
    payload(&response)
}
