//! Router introspection MCP tools for Inspekt.
//!
//! # Tools
//!
//! - `router_get_routes`: every route with mask, defaults and module prefix
//! - `router_match_url`: which presenter and action a URL leads to
//! - `router_generate_url`: the URL for a `Presenter:action` destination
//!
//! The toolkit needs an `Arc<dyn Router>` in the application's container;
//! URL generation additionally needs an `Arc<LinkGenerator>`.

pub mod tools;

// Re-exports
pub use tools::{GenerateUrlArgs, MatchUrlArgs, RouteInfo, RouterToolkit, RoutesResponse};
