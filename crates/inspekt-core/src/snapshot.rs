//! Application described by a JSON snapshot.
//!
//! A snapshot is an export of an application's wiring, schema and routes:
//!
//! ```json
//! {
//!   "services": [
//!     {"name": "articles", "type": "App\\Model\\ArticleFacade", "tags": {"api": true}},
//!     {"name": "orderFactory", "kind": "factory", "resultType": "App\\Order"}
//!   ],
//!   "database": {
//!     "tables": [
//!       {"name": "article", "columns": [{"name": "id", "nativeType": "INT"}], "primaryKey": "id"}
//!     ]
//!   },
//!   "router": {
//!     "routes": [
//!       {"module": "Admin", "routes": [
//!         {"mask": "admin/<presenter>/<action>", "destination": "Dashboard:default"}
//!       ]},
//!       {"mask": "article/<id \\d+>", "destination": "Article:show"}
//!     ]
//!   }
//! }
//! ```
//!
//! The container built from a snapshot holds the database structure as
//! `database.default.explorer`, the router as `router`, and a link
//! generator as `application.linkGenerator`.

use crate::bootstrap::Application;
use crate::container::Container;
use crate::database::{DatabaseStructure, StaticStructure, TableSchema};
use crate::definitions::{Autowired, DefinitionGraph, DefinitionKind, Entity, ServiceDefinition};
use crate::routing::{LinkGenerator, Params, Route, RouteList, Router, destination_params};
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Container name of the database structure.
pub const DATABASE_SERVICE: &str = "database.default.explorer";

/// Container name of the router.
pub const ROUTER_SERVICE: &str = "router";

/// Container name of the link generator.
pub const LINK_GENERATOR_SERVICE: &str = "application.linkGenerator";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Snapshot {
    #[serde(default)]
    services: Vec<RawService>,
    #[serde(default)]
    database: Option<RawDatabase>,
    #[serde(default)]
    router: Option<RawRouter>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawService {
    name: String,
    #[serde(default, rename = "type")]
    type_name: Option<String>,
    #[serde(default)]
    autowired: Autowired,
    #[serde(default)]
    tags: BTreeMap<String, Value>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    factory: Option<String>,
    #[serde(default)]
    setup: Vec<String>,
    #[serde(default)]
    result_type: Option<String>,
    #[serde(default)]
    interface: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawDatabase {
    #[serde(default)]
    tables: Vec<TableSchema>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawRouter {
    List {
        #[serde(default)]
        module: Option<String>,
        routes: Vec<RawRouter>,
    },
    Route {
        mask: String,
        #[serde(default)]
        destination: Option<String>,
        #[serde(default)]
        defaults: Params,
    },
}

impl RawService {
    fn into_definition(self) -> Result<ServiceDefinition> {
        let kind = match self.kind.as_deref().unwrap_or("service") {
            "service" => DefinitionKind::Service {
                factory: self
                    .factory
                    .as_deref()
                    .or(self.type_name.as_deref())
                    .map(Entity::parse),
                setup: self.setup.iter().map(|s| Entity::parse(s)).collect(),
            },
            "factory" => DefinitionKind::Factory {
                result_type: self.result_type,
                interface: self.interface,
            },
            "accessor" => DefinitionKind::Accessor {
                interface: self.interface,
            },
            "imported" => DefinitionKind::Imported,
            "locator" => DefinitionKind::Locator {
                interface: self.interface,
            },
            other => {
                return Err(Error::bootstrap(format!(
                    "service '{}' has unknown kind '{other}'",
                    self.name
                )));
            }
        };

        Ok(ServiceDefinition {
            name: self.name,
            type_name: self.type_name,
            autowired: self.autowired,
            tags: self.tags,
            kind,
        })
    }
}

impl RawRouter {
    fn build(&self) -> Result<Arc<dyn Router>> {
        match self {
            RawRouter::List { module, routes } => {
                let mut list = match module {
                    Some(module) => RouteList::with_module(module.as_str()),
                    None => RouteList::new(),
                };
                for route in routes {
                    list = list.add_shared(route.build()?);
                }
                Ok(Arc::new(list))
            }
            RawRouter::Route {
                mask,
                destination,
                defaults,
            } => {
                let mut params = destination
                    .as_deref()
                    .map(destination_params)
                    .unwrap_or_default();
                params.extend(defaults.clone());
                Ok(Arc::new(Route::new(mask.as_str(), params)?))
            }
        }
    }
}

/// An [`Application`] backed by a snapshot document.
#[derive(Clone, Debug)]
pub struct SnapshotApplication {
    snapshot: Snapshot,
    base_url: Url,
}

impl SnapshotApplication {
    /// Read a snapshot file.
    pub fn load(path: &Path, base_url: Url) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let app = Self::from_json_str(&content, base_url).map_err(|e| {
            Error::bootstrap(format!("Failed to load snapshot {}: {e}", path.display()))
        })?;
        log::debug!(
            "Loaded snapshot {} ({} services)",
            path.display(),
            app.snapshot.services.len()
        );
        Ok(app)
    }

    /// Parse a snapshot document.
    pub fn from_json_str(content: &str, base_url: Url) -> Result<Self> {
        Ok(Self {
            snapshot: serde_json::from_str(content)?,
            base_url,
        })
    }
}

impl Application for SnapshotApplication {
    fn definition_graph(&self) -> Result<DefinitionGraph> {
        let definitions = self
            .snapshot
            .services
            .iter()
            .cloned()
            .map(RawService::into_definition)
            .collect::<Result<Vec<_>>>()?;
        Ok(DefinitionGraph::new(definitions))
    }

    fn create_container(&self) -> Result<Container> {
        let mut container = Container::new();

        if let Some(database) = &self.snapshot.database {
            let structure: Arc<dyn DatabaseStructure> =
                Arc::new(StaticStructure::new(database.tables.clone()));
            container.add_service(DATABASE_SERVICE, structure, true);
        }

        if let Some(router) = &self.snapshot.router {
            let router = router.build()?;
            let links = Arc::new(LinkGenerator::new(router.clone(), self.base_url.clone()));
            container.add_service(ROUTER_SERVICE, router, true);
            container.add_service(LINK_GENERATOR_SERVICE, links, true);
        }

        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SHOP: &str = r#"{
        "services": [
            {"name": "articles", "type": "App\\Model\\ArticleFacade", "tags": {"api": true}},
            {"name": "mailer", "type": "Mail\\Mailer", "factory": "@mailFactory::create",
             "setup": ["Mail\\Mailer::boot"]},
            {"name": "orderFactory", "kind": "factory", "resultType": "App\\Order",
             "interface": "App\\OrderFactory", "autowired": false}
        ],
        "database": {
            "tables": [
                {"name": "article", "columns": [{"name": "id", "nativeType": "INT"}],
                 "primaryKey": "id"}
            ]
        },
        "router": {
            "routes": [
                {"mask": "article/<id \\d+>", "destination": "Article:show"},
                {"mask": "<presenter>/<action>", "destination": "Homepage:default"}
            ]
        }
    }"#;

    fn base() -> Url {
        Url::parse("http://localhost/").unwrap()
    }

    #[test]
    fn test_definition_graph() {
        let app = SnapshotApplication::from_json_str(SHOP, base()).unwrap();
        let graph = app.definition_graph().unwrap();
        assert_eq!(graph.len(), 3);

        let mailer = graph.get("mailer").unwrap();
        match &mailer.kind {
            DefinitionKind::Service { factory, setup } => {
                assert_eq!(factory.as_ref().and_then(Entity::describe), None);
                assert_eq!(setup.len(), 1);
            }
            other => panic!("unexpected kind: {other:?}"),
        }

        let factory = graph.get("orderFactory").unwrap();
        assert_eq!(factory.kind.label(), "factory");
        assert_eq!(factory.autowired, Autowired::Enabled(false));
    }

    #[test]
    fn test_container_services() {
        let app = SnapshotApplication::from_json_str(SHOP, base()).unwrap();
        let container = app.create_container().unwrap();
        assert_eq!(
            container.service_names(),
            vec![DATABASE_SERVICE, ROUTER_SERVICE, LINK_GENERATOR_SERVICE]
        );

        let links: Arc<LinkGenerator> = container.get_by_type().unwrap();
        let mut params = Params::new();
        params.insert("id".to_string(), Value::from(4));
        assert_eq!(
            links.link("Article:show", &params).unwrap(),
            "http://localhost/article/4"
        );
    }

    #[test]
    fn test_empty_snapshot() {
        let app = SnapshotApplication::from_json_str("{}", base()).unwrap();
        assert!(app.definition_graph().unwrap().is_empty());
        assert!(app.create_container().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_kind_fails_graph() {
        let app = SnapshotApplication::from_json_str(
            r#"{"services": [{"name": "x", "kind": "magic"}]}"#,
            base(),
        )
        .unwrap();
        assert!(matches!(app.definition_graph(), Err(Error::Bootstrap(_))));
    }

    #[test]
    fn test_bad_route_fails_container() {
        let app = SnapshotApplication::from_json_str(
            r#"{"router": {"routes": [{"mask": "<id"}]}}"#,
            base(),
        )
        .unwrap();
        assert!(matches!(
            app.create_container(),
            Err(Error::InvalidRoute { .. })
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SHOP.as_bytes()).unwrap();
        let app = SnapshotApplication::load(file.path(), base()).unwrap();
        assert_eq!(app.definition_graph().unwrap().len(), 3);
    }

    #[test]
    fn test_load_errors() {
        let missing = SnapshotApplication::load(Path::new("/nonexistent/app.json"), base());
        assert!(matches!(missing, Err(Error::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let broken = SnapshotApplication::load(file.path(), base());
        assert!(matches!(broken, Err(Error::Bootstrap(_))));
    }
}
