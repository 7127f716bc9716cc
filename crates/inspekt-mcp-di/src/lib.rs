//! Service container introspection MCP tools for Inspekt.
//!
//! # Tools
//!
//! - `di_get_services`: registered services with type, autowiring and tags
//! - `di_get_service`: one service with its kind, factory and setup calls
//!
//! # Example
//!
//! ```rust,ignore
//! use inspekt_mcp::Availability;
//! use inspekt_mcp_di::DiToolkit;
//!
//! if let Availability::Available(toolkit) = DiToolkit::try_create(&bridge) {
//!     registry.register_toolkit(&toolkit)?;
//! }
//! ```

pub mod tools;

// Re-exports
pub use tools::{
    DiToolkit, GetServiceArgs, GetServicesArgs, ServiceDetails, ServiceInfo, ServicesResponse,
};
