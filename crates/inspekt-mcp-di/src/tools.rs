//! MCP tools for service container introspection.
//!
//! Provides `DiToolkit`, which answers questions about the application's
//! service definitions: what is registered, under which type, and how each
//! service is created.

use inspekt_core::ApplicationBridge;
use inspekt_core::definitions::{Autowired, DefinitionGraph, DefinitionKind, ServiceDefinition};
use inspekt_mcp::{Availability, ToolDefinition, Toolkit, domain_error, serialize_response};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Argument types
// ---------------------------------------------------------------------------

/// Arguments for `di_get_services`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetServicesArgs {
    /// Optional filter by service name or type (case-sensitive substring match)
    pub filter: Option<String>,
}

/// Arguments for `di_get_service`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetServiceArgs {
    /// The exact service name as registered in the DI container
    pub name: String,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Summary of one service.
#[derive(Clone, Debug, Serialize)]
pub struct ServiceInfo {
    /// Service name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    /// Autowiring setting.
    pub autowired: Autowired,
    /// Tags and their values.
    pub tags: BTreeMap<String, Value>,
}

/// Response from `di_get_services`.
#[derive(Clone, Debug, Serialize)]
pub struct ServicesResponse {
    /// Matching services in declaration order.
    pub services: Vec<ServiceInfo>,
    /// Number of matching services.
    pub count: usize,
}

/// Response from `di_get_service`.
///
/// Fields that do not apply to the service's kind are left out; fields that
/// apply but are unknown are `null`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetails {
    /// Summary fields.
    #[serde(flatten)]
    pub info: ServiceInfo,
    /// `service`, `factory`, `accessor`, `imported` or `locator`.
    pub kind: &'static str,
    /// Creating entity; `null` when it is a call on another service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory: Option<Option<String>>,
    /// Setup calls in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub setup: Vec<Option<String>>,
    /// Type produced by a generated factory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type: Option<Option<String>>,
    /// Interface implemented by a generated factory, accessor or locator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<Option<String>>,
}

impl From<&ServiceDefinition> for ServiceInfo {
    fn from(definition: &ServiceDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            type_name: definition.type_name.clone(),
            autowired: definition.autowired.clone(),
            tags: definition.tags.clone(),
        }
    }
}

impl From<&ServiceDefinition> for ServiceDetails {
    fn from(definition: &ServiceDefinition) -> Self {
        let mut details = Self {
            info: ServiceInfo::from(definition),
            kind: definition.kind.label(),
            factory: None,
            setup: Vec::new(),
            result_type: None,
            interface: None,
        };

        match &definition.kind {
            DefinitionKind::Service { factory, setup } => {
                details.factory = factory.as_ref().map(|f| f.describe());
                details.setup = setup.iter().map(|s| s.describe()).collect();
            }
            DefinitionKind::Factory {
                result_type,
                interface,
            } => {
                details.result_type = Some(result_type.clone());
                details.interface = Some(interface.clone());
            }
            DefinitionKind::Accessor { interface } | DefinitionKind::Locator { interface } => {
                details.interface = Some(interface.clone());
            }
            DefinitionKind::Imported => {}
        }
        details
    }
}

// ---------------------------------------------------------------------------
// DiToolkit
// ---------------------------------------------------------------------------

/// MCP tools over the service definition graph.
///
/// Generates two tools:
/// - `di_get_services`: list services, optionally filtered
/// - `di_get_service`: details of one service
#[derive(Clone, Debug)]
pub struct DiToolkit {
    graph: Arc<DefinitionGraph>,
}

impl DiToolkit {
    /// Create the toolkit over a definition graph.
    pub fn new(graph: Arc<DefinitionGraph>) -> Self {
        Self { graph }
    }

    /// Create the toolkit if the application can describe its services.
    pub fn try_create(bridge: &ApplicationBridge) -> Availability<Self> {
        match bridge.definition_graph() {
            Ok(graph) => Availability::Available(Self::new(graph)),
            Err(e) => Availability::Absent(format!("definition graph unavailable: {e}")),
        }
    }

    /// Services whose name or type contains `filter`, or all of them.
    pub fn services(&self, filter: Option<&str>) -> ServicesResponse {
        let services: Vec<ServiceInfo> = self
            .graph
            .definitions()
            .iter()
            .filter(|d| match filter {
                None => true,
                Some(filter) => {
                    d.name.contains(filter)
                        || d.type_name.as_deref().is_some_and(|t| t.contains(filter))
                }
            })
            .map(ServiceInfo::from)
            .collect();

        ServicesResponse {
            count: services.len(),
            services,
        }
    }

    /// Details of the service named exactly `name`.
    pub fn service(&self, name: &str) -> Option<ServiceDetails> {
        self.graph.get(name).map(ServiceDetails::from)
    }
}

impl Toolkit for DiToolkit {
    fn name(&self) -> &str {
        "di"
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        let list = self.clone();
        let detail = self.clone();

        vec![
            ToolDefinition::typed(
                "di_get_services",
                "List all registered DI container services with their types and autowiring info",
                move |args: GetServicesArgs| {
                    let response = list.services(args.filter.as_deref());
                    async move { serialize_response(&response) }
                },
            )
            .read_only(),
            ToolDefinition::typed(
                "di_get_service",
                "Get detailed information about a specific service including factory, setup calls, and tags",
                move |args: GetServiceArgs| {
                    let details = detail.service(&args.name);
                    async move {
                        match details {
                            Some(details) => serialize_response(&details),
                            None => Ok(domain_error(format!("Service '{}' not found", args.name))),
                        }
                    }
                },
            )
            .read_only(),
        ]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use inspekt_core::definitions::Entity;
    use inspekt_core::{Application, Container};
    use inspekt_mcp::Arguments;
    use serde_json::json;

    fn graph() -> DefinitionGraph {
        DefinitionGraph::new(vec![
            ServiceDefinition::service("articles", "App\\Model\\ArticleFacade")
                .with_tag("api", json!(true)),
            ServiceDefinition::service("mailer", "Mail\\Mailer").with_kind(DefinitionKind::Service {
                factory: Some(Entity::parse("@mailFactory::create")),
                setup: vec![Entity::parse("Mail\\Mailer::boot")],
            }),
            ServiceDefinition {
                autowired: Autowired::Enabled(false),
                ..ServiceDefinition::service("orderFactory", "App\\OrderFactory")
            }
            .with_kind(DefinitionKind::Factory {
                result_type: Some("App\\Order".to_string()),
                interface: Some("App\\OrderFactory".to_string()),
            }),
            ServiceDefinition::service("session", "Http\\Session")
                .with_kind(DefinitionKind::Imported),
        ])
    }

    fn toolkit() -> DiToolkit {
        DiToolkit::new(Arc::new(graph()))
    }

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => map,
            _ => Arguments::new(),
        }
    }

    async fn call(name: &str, arguments: Value) -> Value {
        let tools = toolkit().tools();
        let tool = tools.iter().find(|t| t.name() == name).unwrap();
        tool.invoke(args(arguments)).await.unwrap()
    }

    // -- Construction -------------------------------------------------------

    struct Broken;

    impl Application for Broken {
        fn definition_graph(&self) -> inspekt_core::Result<DefinitionGraph> {
            Err(inspekt_core::Error::bootstrap("compiler failed"))
        }

        fn create_container(&self) -> inspekt_core::Result<Container> {
            Ok(Container::new())
        }
    }

    #[test]
    fn test_try_create_absent_without_graph() {
        let bridge = ApplicationBridge::new(Box::new(Broken));
        let availability = DiToolkit::try_create(&bridge);
        assert!(!availability.is_available());
        assert!(availability.reason().unwrap().contains("compiler failed"));
    }

    #[test]
    fn test_tool_names() {
        let tools = toolkit().tools();
        let names: Vec<&str> = tools.iter().map(ToolDefinition::name).collect();
        assert_eq!(names, vec!["di_get_services", "di_get_service"]);
        assert_eq!(tools[1].input_schema()["required"], json!(["name"]));
    }

    // -- di_get_services ----------------------------------------------------

    #[tokio::test]
    async fn test_get_services_all() {
        let value = call("di_get_services", json!({})).await;
        assert_eq!(value["count"], 4);
        assert_eq!(
            value["services"][0],
            json!({
                "name": "articles",
                "type": "App\\Model\\ArticleFacade",
                "autowired": true,
                "tags": {"api": true}
            })
        );
        assert_eq!(value["services"][2]["autowired"], false);
    }

    #[tokio::test]
    async fn test_get_services_filter_name_or_type() {
        let value = call("di_get_services", json!({"filter": "Mail"})).await;
        assert_eq!(value["count"], 1);
        assert_eq!(value["services"][0]["name"], "mailer");

        let value = call("di_get_services", json!({"filter": "order"})).await;
        assert_eq!(value["count"], 1);

        let value = call("di_get_services", json!({"filter": "mail"})).await;
        assert_eq!(value["count"], 1, "filter is case-sensitive");

        let value = call("di_get_services", json!({"filter": "nothing"})).await;
        assert_eq!(value, json!({"services": [], "count": 0}));
    }

    // -- di_get_service -----------------------------------------------------

    #[tokio::test]
    async fn test_get_service_plain() {
        let value = call("di_get_service", json!({"name": "articles"})).await;
        assert_eq!(value["kind"], "service");
        assert_eq!(value["factory"], "App\\Model\\ArticleFacade");
        assert!(value.get("setup").is_none());
        assert!(value.get("resultType").is_none());
    }

    #[tokio::test]
    async fn test_get_service_reference_factory_and_setup() {
        let value = call("di_get_service", json!({"name": "mailer"})).await;
        assert_eq!(value["factory"], Value::Null);
        assert!(value.as_object().unwrap().contains_key("factory"));
        assert_eq!(value["setup"], json!(["Mail\\Mailer::boot"]));
    }

    #[tokio::test]
    async fn test_get_service_factory_kind() {
        let value = call("di_get_service", json!({"name": "orderFactory"})).await;
        assert_eq!(value["kind"], "factory");
        assert_eq!(value["resultType"], "App\\Order");
        assert_eq!(value["interface"], "App\\OrderFactory");
        assert!(value.get("factory").is_none());
    }

    #[tokio::test]
    async fn test_get_service_imported() {
        let value = call("di_get_service", json!({"name": "session"})).await;
        assert_eq!(value["kind"], "imported");
        assert_eq!(value["name"], "session");
    }

    #[tokio::test]
    async fn test_get_service_not_found() {
        let value = call("di_get_service", json!({"name": "Articles"})).await;
        assert_eq!(value, json!({"error": "Service 'Articles' not found"}));
    }
}
