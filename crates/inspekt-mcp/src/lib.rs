//! MCP server infrastructure for Inspekt.
//!
//! This crate turns a set of toolkits into a JSON-RPC tool server that can be
//! driven over a persistent stream or one HTTP exchange at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      inspekt-mcp                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ToolDefinition: metadata + bound handler                   │
//! │  ToolRegistry: ordered, name-indexed, frozen when serving   │
//! │  Toolkit / Availability: provider contract                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ProtocolServer: initialize, tools/list, tools/call         │
//! │  validate_arguments: schema check before every call         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Transport                                                  │
//! │  ├── StreamTransport: newline-delimited JSON-RPC (stdio)    │
//! │  └── SingleShotTransport: one http::Request → one Response  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use inspekt_mcp::{ProtocolServer, StreamTransport, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register_toolkit(&my_toolkit)?;
//!
//! ProtocolServer::new(registry)
//!     .with_name("inspekt")
//!     .run(StreamTransport::stdio())
//!     .await?;
//! ```

pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod tool;
pub mod transport;
pub mod validate;

// Re-export rmcp model types used in tool definitions and results
pub use rmcp::model;

// Re-exports: error
pub use error::{Error, McpErrorExt, Result, ToolError};

// Re-exports: tools and registry
pub use registry::{Availability, DuplicatePolicy, ToolRegistry, Toolkit};
pub use tool::{Arguments, ToolDefinition, domain_error, serialize_response};

// Re-exports: server and transports
pub use protocol::{ProtocolRequest, ProtocolResult, Reply};
pub use server::{ProtocolServer, ServerInfo};
pub use transport::{SingleShotTransport, StreamTransport, Transport};
