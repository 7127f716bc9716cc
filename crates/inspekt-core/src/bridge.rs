//! Lazy access to the inspected application.
//!
//! The bridge is created at startup, but the definition graph and the
//! container are only built on first use and then reused. A failed build is
//! not remembered: the next call tries again.

use crate::bootstrap::{Application, BootstrapCatalog, BootstrapContext};
use crate::config::InspectorConfig;
use crate::container::Container;
use crate::definitions::DefinitionGraph;
use crate::routing::parse_url;
use crate::{Error, Result};
use std::any::Any;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Handle on the inspected application shared by all toolkits.
pub struct ApplicationBridge {
    app: Box<dyn Application>,
    graph: Mutex<Option<Arc<DefinitionGraph>>>,
    container: Mutex<Option<Arc<Container>>>,
}

impl ApplicationBridge {
    /// Wrap an already loaded application.
    pub fn new(app: Box<dyn Application>) -> Self {
        Self {
            app,
            graph: Mutex::new(None),
            container: Mutex::new(None),
        }
    }

    /// Load the configured application.
    ///
    /// Fails when the bootstrap name is unknown, the base URL is invalid,
    /// or the entry point cannot be loaded.
    pub fn boot(
        config: &InspectorConfig,
        catalog: &BootstrapCatalog,
        base_dir: &Path,
    ) -> Result<Self> {
        let bootstrap = catalog.resolve(&config.bootstrap_class)?;
        let base_url = parse_url(&config.base_url)
            .map_err(|e| Error::config(format!("Invalid baseUrl: {e}")))?;

        let entry_point = config.bootstrap_path(base_dir);
        if !entry_point.is_file() {
            return Err(Error::bootstrap(format!(
                "Entry point {} does not exist or is not a file",
                entry_point.display()
            )));
        }

        log::info!(
            "Booting application from {} using '{}'",
            entry_point.display(),
            config.bootstrap_class
        );
        let app = bootstrap(&BootstrapContext {
            entry_point,
            base_url,
        })?;
        Ok(Self::new(app))
    }

    /// The service definition graph, built on first use.
    pub fn definition_graph(&self) -> Result<Arc<DefinitionGraph>> {
        let mut slot = self.graph.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(graph) = slot.as_ref() {
            return Ok(Arc::clone(graph));
        }

        let graph = Arc::new(self.app.definition_graph()?);
        log::debug!("Built definition graph with {} services", graph.len());
        *slot = Some(Arc::clone(&graph));
        Ok(graph)
    }

    /// The service container, built on first use.
    pub fn container(&self) -> Result<Arc<Container>> {
        let mut slot = self.container.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(container) = slot.as_ref() {
            return Ok(Arc::clone(container));
        }

        let container = Arc::new(self.app.create_container()?);
        log::debug!("Built container with {} services", container.len());
        *slot = Some(Arc::clone(&container));
        Ok(container)
    }

    /// Whether the container has a service with this exact name.
    pub fn container_has_service(&self, name: &str) -> Result<bool> {
        Ok(self.container()?.has_service(name))
    }

    /// Fetch the single autowired service of type `T` from the container.
    pub fn container_get_by_type<T: Any + Clone>(&self) -> Result<T> {
        self.container()?.get_by_type()
    }
}

impl std::fmt::Debug for ApplicationBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let built = |ready: bool| if ready { "built" } else { "pending" };
        let graph = self.graph.lock().map(|g| g.is_some()).unwrap_or(false);
        let container = self.container.lock().map(|c| c.is_some()).unwrap_or(false);
        f.debug_struct("ApplicationBridge")
            .field("graph", &built(graph))
            .field("container", &built(container))
            .finish()
    }
}
