//! Server assembly.
//!
//! Assembly moves through three states, each its own type:
//!
//! ```text
//! ServerAssembly ──configure()──▶ Assembling ──assemble()──▶ Serving
//!  (builder)                      (config loaded,            (registry frozen,
//!                                  application booted)        transport chosen on run)
//! ```
//!
//! Built-in toolkits are optional: when one cannot find its data source it
//! is logged and skipped. Toolkits named in the configuration are required:
//! any failure to construct one aborts assembly.

use crate::catalog::ToolkitCatalog;
use crate::error::{Error, Result};
use inspekt_core::{ApplicationBridge, BootstrapCatalog, InspectorConfig};
use inspekt_mcp::{
    Availability, DuplicatePolicy, ProtocolServer, ServerInfo, SingleShotTransport,
    StreamTransport, ToolRegistry, Toolkit,
};
use inspekt_mcp_db::DbToolkit;
use inspekt_mcp_di::DiToolkit;
use inspekt_mcp_router::RouterToolkit;
use std::path::{Path, PathBuf};

/// Where a request came from, which decides the transport.
#[derive(Debug)]
pub enum InvocationContext {
    /// The process's stdin/stdout carry the session.
    Stdio,
    /// One inbound HTTP request.
    Http(http::Request<String>),
}

/// What serving ended with.
#[derive(Debug)]
pub enum Outcome {
    /// The stream closed after this many messages.
    Closed(usize),
    /// The response to the single inbound request.
    Response(http::Response<String>),
}

// ============================================================================
// ServerAssembly
// ============================================================================

/// Builder for a server; nothing is read or loaded until [`configure`].
///
/// [`configure`]: ServerAssembly::configure
#[derive(Clone, Debug)]
pub struct ServerAssembly {
    config_path: Option<PathBuf>,
    base_dir: PathBuf,
    bootstraps: BootstrapCatalog,
    toolkits: ToolkitCatalog,
    info: ServerInfo,
    policy: DuplicatePolicy,
}

impl Default for ServerAssembly {
    fn default() -> Self {
        Self {
            config_path: None,
            base_dir: PathBuf::from("."),
            bootstraps: BootstrapCatalog::default(),
            toolkits: ToolkitCatalog::default(),
            info: ServerInfo::default(),
            policy: DuplicatePolicy::default(),
        }
    }
}

impl ServerAssembly {
    /// Start with defaults: `./mcp-config.toml`, snapshot bootstrap, no
    /// user toolkits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from this file instead of the default location.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Directory the configuration and relative entry points are resolved in.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Bootstraps available to `bootstrapClass`.
    pub fn with_bootstraps(mut self, bootstraps: BootstrapCatalog) -> Self {
        self.bootstraps = bootstraps;
        self
    }

    /// Toolkits available to `toolkits`.
    pub fn with_toolkits(mut self, toolkits: ToolkitCatalog) -> Self {
        self.toolkits = toolkits;
        self
    }

    /// Name reported to clients.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.info.name = name.into();
        self
    }

    /// What to do when two toolkits register the same tool name.
    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Load the configuration and boot the application.
    pub fn configure(self) -> Result<Assembling> {
        let path = InspectorConfig::resolve_path(self.config_path.as_deref(), &self.base_dir);
        let config = InspectorConfig::load(&path).map_err(Error::Config)?;
        let bridge = ApplicationBridge::boot(&config, &self.bootstraps, &self.base_dir)
            .map_err(Error::Bootstrap)?;

        Ok(Assembling {
            config,
            bridge,
            toolkits: self.toolkits,
            info: self.info,
            policy: self.policy,
        })
    }
}

// ============================================================================
// Assembling
// ============================================================================

/// Configured server whose toolkits are not yet registered.
#[derive(Debug)]
pub struct Assembling {
    config: InspectorConfig,
    bridge: ApplicationBridge,
    toolkits: ToolkitCatalog,
    info: ServerInfo,
    policy: DuplicatePolicy,
}

impl Assembling {
    /// Loaded configuration.
    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Bridge to the booted application.
    pub fn bridge(&self) -> &ApplicationBridge {
        &self.bridge
    }

    /// Register built-in toolkits in fixed order (di, db, router), then the
    /// configured toolkits in configuration order, and freeze the registry.
    pub fn assemble(self) -> Result<Serving> {
        let mut registry = ToolRegistry::with_policy(self.policy);

        register_builtin(&mut registry, "di", DiToolkit::try_create(&self.bridge))?;
        register_builtin(&mut registry, "db", DbToolkit::try_create(&self.bridge))?;
        register_builtin(&mut registry, "router", RouterToolkit::try_create(&self.bridge))?;

        for name in &self.config.toolkits {
            let toolkit = self.toolkits.construct(name, &self.bridge)?;
            let count = registry.register_toolkit(toolkit.as_ref())?;
            log::info!("Loaded toolkit '{name}' ({count} tools)");
        }

        log::info!("Serving {} tools: {}", registry.len(), registry.names().join(", "));
        Ok(Serving {
            server: ProtocolServer::new(registry).with_info(self.info),
        })
    }
}

fn register_builtin<T: Toolkit>(
    registry: &mut ToolRegistry,
    name: &str,
    availability: Availability<T>,
) -> Result<()> {
    match availability {
        Availability::Available(toolkit) => {
            let count = registry.register_toolkit(&toolkit)?;
            log::info!("Built-in toolkit '{name}' available ({count} tools)");
        }
        Availability::Absent(reason) => {
            log::info!("Built-in toolkit '{name}' skipped: {reason}");
        }
    }
    Ok(())
}

// ============================================================================
// Serving
// ============================================================================

/// Assembled server, ready to run over a transport.
#[derive(Clone, Debug)]
pub struct Serving {
    server: ProtocolServer,
}

impl Serving {
    /// The protocol server.
    pub fn server(&self) -> &ProtocolServer {
        &self.server
    }

    /// Names of the registered tools in order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.server.registry().names()
    }

    /// Serve over stdin/stdout until stdin closes.
    pub async fn serve_stdio(&self) -> Result<usize> {
        Ok(self.server.run(StreamTransport::stdio()).await?)
    }

    /// Answer one HTTP request.
    pub async fn serve_request(
        &self,
        request: http::Request<String>,
    ) -> Result<http::Response<String>> {
        Ok(self.server.run(SingleShotTransport::new(request)).await?)
    }

    /// Serve with the transport matching `context`.
    pub async fn run(&self, context: InvocationContext) -> Result<Outcome> {
        match context {
            InvocationContext::Stdio => self.serve_stdio().await.map(Outcome::Closed),
            InvocationContext::Http(request) => {
                self.serve_request(request).await.map(Outcome::Response)
            }
        }
    }
}

/// Configure and assemble in one step.
pub fn assemble(assembly: ServerAssembly) -> Result<Serving> {
    assembly.configure()?.assemble()
}

/// Directory holding `config`, used as base directory when none is given.
pub fn base_dir_of(config: &Path) -> PathBuf {
    match config.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ============================================================================
// Tests
// ============================================================================
