//! MCP tools for router introspection.
//!
//! Provides `RouterToolkit`, which lists the application's routes, matches
//! URLs against them and generates URLs for destinations.

use inspekt_core::routing::{
    ACTION_KEY, DEFAULT_ACTION, PRESENTER_KEY, Params, Router, normalize_url, parse_url,
};
use inspekt_core::{ApplicationBridge, LinkGenerator};
use inspekt_mcp::{Availability, ToolDefinition, Toolkit, domain_error, serialize_response};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Argument types
// ---------------------------------------------------------------------------

/// Arguments for `router_get_routes`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoArgs {}

/// Arguments for `router_match_url`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MatchUrlArgs {
    /// URL to match (e.g., "/article/123" or "https://example.com/article/123")
    pub url: String,
}

/// Arguments for `router_generate_url`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateUrlArgs {
    /// Presenter:action notation (e.g., "Article:show" or ":Front:Article:show")
    pub destination: String,
    /// Optional parameters for the URL (e.g., {"id": 123})
    pub params: Option<Map<String, Value>>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One leaf route of the routing tree.
#[derive(Clone, Debug, Serialize)]
pub struct RouteInfo {
    /// Router implementation name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Module prefix accumulated from enclosing lists, e.g. `Admin:`.
    pub prefix: Option<String>,
    /// URL mask.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    /// Default presenter, including the prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presenter: Option<String>,
    /// Default action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,
}

/// Response from `router_get_routes`.
#[derive(Clone, Debug, Serialize)]
pub struct RoutesResponse {
    /// Leaf routes in matching order.
    pub routes: Vec<RouteInfo>,
    /// Number of routes.
    pub count: usize,
}

// ---------------------------------------------------------------------------
// RouterToolkit
// ---------------------------------------------------------------------------

/// MCP tools over the application's router.
///
/// Generates three tools:
/// - `router_get_routes`: flattened route list
/// - `router_match_url`: URL to presenter, action and parameters
/// - `router_generate_url`: destination to URL
#[derive(Clone)]
pub struct RouterToolkit {
    router: Arc<dyn Router>,
    links: Option<Arc<LinkGenerator>>,
}

impl RouterToolkit {
    /// Create the toolkit over a router and an optional link generator.
    pub fn new(router: Arc<dyn Router>, links: Option<Arc<LinkGenerator>>) -> Self {
        Self { router, links }
    }

    /// Create the toolkit if the container provides a router.
    ///
    /// A missing link generator only disables URL generation.
    pub fn try_create(bridge: &ApplicationBridge) -> Availability<Self> {
        let container = match bridge.container() {
            Ok(container) => container,
            Err(e) => return Availability::Absent(format!("container unavailable: {e}")),
        };

        let router = match container.get_by_type::<Arc<dyn Router>>() {
            Ok(router) => router,
            Err(e) => return Availability::Absent(format!("no router: {e}")),
        };
        let links = container.get_by_type::<Arc<LinkGenerator>>().ok();

        Availability::Available(Self::new(router, links))
    }

    /// Every leaf route with its module prefix.
    pub fn routes(&self) -> RoutesResponse {
        let mut routes = Vec::new();
        collect_routes(self.router.as_ref(), "", &mut routes);
        RoutesResponse {
            count: routes.len(),
            routes,
        }
    }

    /// Match `url`; relative URLs are taken against `http://localhost`.
    pub fn match_url(&self, url: &str) -> Value {
        let url = normalize_url(url);
        let parsed = match parse_url(&url) {
            Ok(parsed) => parsed,
            Err(e) => return json!({ "matched": false, "url": url, "error": e.to_string() }),
        };

        let Some(mut params) = self.router.match_url(&parsed) else {
            return json!({ "matched": false, "url": url, "error": "No route matches this URL" });
        };

        let presenter = params.remove(PRESENTER_KEY).unwrap_or(Value::Null);
        let action = match params.remove(ACTION_KEY) {
            None | Some(Value::Null) => Value::String(DEFAULT_ACTION.to_string()),
            Some(action) => action,
        };

        json!({
            "matched": true,
            "url": url,
            "presenter": presenter,
            "action": action,
            "params": params,
        })
    }

    /// Generate the URL for `destination`.
    pub fn generate_url(&self, destination: &str, params: Option<Params>) -> Value {
        let Some(links) = &self.links else {
            return domain_error("LinkGenerator not configured");
        };

        let params = params.unwrap_or_default();
        match links.link(destination, &params) {
            Ok(url) => json!({ "destination": destination, "params": params, "url": url }),
            Err(e) => {
                json!({ "destination": destination, "params": params, "error": e.to_string() })
            }
        }
    }
}

fn collect_routes(router: &dyn Router, prefix: &str, out: &mut Vec<RouteInfo>) {
    if let Some(list) = router.as_list() {
        let prefix = match list.module() {
            Some(module) => format!("{prefix}{module}:"),
            None => prefix.to_string(),
        };
        for child in list.routes() {
            collect_routes(child.as_ref(), &prefix, out);
        }
        return;
    }

    let defaults = router.defaults();
    out.push(RouteInfo {
        type_name: router.type_name().to_string(),
        prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
        mask: router.mask().map(str::to_string),
        presenter: defaults
            .and_then(|d| d.get(PRESENTER_KEY))
            .and_then(Value::as_str)
            .map(|presenter| format!("{prefix}{presenter}")),
        action: defaults.and_then(|d| d.get(ACTION_KEY)).cloned(),
    });
}

impl Toolkit for RouterToolkit {
    fn name(&self) -> &str {
        "router"
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        let listing = self.clone();
        let matching = self.clone();
        let generating = self.clone();

        vec![
            ToolDefinition::typed(
                "router_get_routes",
                "List all registered routes with their masks, defaults, and module prefixes",
                move |_: NoArgs| {
                    let response = listing.routes();
                    async move { serialize_response(&response) }
                },
            )
            .read_only(),
            ToolDefinition::typed(
                "router_match_url",
                "Match URL to presenter/action and extract parameters",
                move |args: MatchUrlArgs| {
                    let response = matching.match_url(&args.url);
                    async move { Ok(response) }
                },
            )
            .read_only(),
            ToolDefinition::typed(
                "router_generate_url",
                "Generate URL for presenter/action using LinkGenerator",
                move |args: GenerateUrlArgs| {
                    let response = generating.generate_url(&args.destination, args.params);
                    async move { Ok(response) }
                },
            )
            .read_only(),
        ]
    }
}

impl std::fmt::Debug for RouterToolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterToolkit")
            .field("router", &self.router.type_name())
            .field("links", &self.links.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
