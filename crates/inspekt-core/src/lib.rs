//! Inspekt Core: the inspected application as the inspector sees it.
//!
//! This crate holds everything the MCP toolkits read from: configuration,
//! the [`ApplicationBridge`] that lazily boots the application, and the
//! contracts of the three introspected subsystems.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`config`]: `mcp-config.toml` loading
//! - [`bootstrap`]: [`Application`] seam and named bootstraps
//! - [`bridge`]: memoized access to the definition graph and container
//! - [`container`]: constructed services, looked up by name or type
//! - [`definitions`]: service definitions before instantiation
//! - [`database`]: database structure reflection
//! - [`routing`]: routers, routes and link generation
//! - [`snapshot`]: application loaded from a JSON snapshot

pub mod bootstrap;
pub mod bridge;
pub mod config;
pub mod container;
pub mod database;
pub mod definitions;
pub mod error;
pub mod routing;
pub mod snapshot;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};

pub use bootstrap::{Application, BootstrapCatalog, BootstrapContext, BootstrapFn};
pub use bridge::ApplicationBridge;
pub use config::InspectorConfig;
pub use container::Container;
pub use database::{DatabaseStructure, StaticStructure, TableSchema};
pub use definitions::{DefinitionGraph, ServiceDefinition};
pub use routing::{LinkGenerator, Router};
pub use snapshot::SnapshotApplication;
