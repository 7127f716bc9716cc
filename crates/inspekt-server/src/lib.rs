//! Composition root for the Inspekt MCP server.
//!
//! Loads the configuration, boots the inspected application through
//! `inspekt-core`, registers the built-in toolkits (`di`, `db`, `router`)
//! plus any configured user toolkits, and serves the result over stdio or
//! HTTP.
//!
//! ```no_run
//! use inspekt_server::{assemble, ServerAssembly};
//!
//! # async fn run() -> inspekt_server::Result<()> {
//! let serving = assemble(ServerAssembly::new().with_base_dir("site"))?;
//! serving.serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod assembly;
pub mod catalog;
pub mod error;
#[cfg(feature = "http")]
pub mod http;

pub use assembly::{
    Assembling, InvocationContext, Outcome, ServerAssembly, Serving, assemble, base_dir_of,
};
pub use catalog::{ToolkitCatalog, ToolkitConstructor};
pub use error::{Error, Result};
