//! Application entry points.
//!
//! An [`Application`] is the inspected program as seen by the inspector: it
//! can describe its service definitions and build its service container.
//! A [`BootstrapCatalog`] maps the configured `bootstrapClass` name to a
//! function that loads an application from its entry point.

use crate::container::Container;
use crate::definitions::DefinitionGraph;
use crate::snapshot::SnapshotApplication;
use crate::{Error, Result};
use std::path::PathBuf;
use url::Url;

/// An inspected application.
pub trait Application: Send + Sync {
    /// Describe all service definitions without instantiating anything.
    fn definition_graph(&self) -> Result<DefinitionGraph>;

    /// Build the service container.
    fn create_container(&self) -> Result<Container>;
}

/// What a bootstrap function receives.
#[derive(Clone, Debug)]
pub struct BootstrapContext {
    /// Resolved entry point path.
    pub entry_point: PathBuf,
    /// Base URL for generated links.
    pub base_url: Url,
}

/// Loads an application from its entry point.
pub type BootstrapFn = fn(&BootstrapContext) -> Result<Box<dyn Application>>;

/// Named bootstrap functions.
///
/// [`BootstrapCatalog::default`] contains `snapshot`, which loads a
/// [`SnapshotApplication`] from a JSON file.
#[derive(Clone)]
pub struct BootstrapCatalog {
    entries: Vec<(String, BootstrapFn)>,
}

impl BootstrapCatalog {
    /// Create an empty catalog.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a bootstrap, replacing any with the same name.
    pub fn register(mut self, name: impl Into<String>, bootstrap: BootstrapFn) -> Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = bootstrap,
            None => self.entries.push((name, bootstrap)),
        }
        self
    }

    /// Find the bootstrap registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<BootstrapFn> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bootstrap)| *bootstrap)
            .ok_or_else(|| Error::UnknownBootstrap {
                name: name.to_string(),
                registered: self.names().into_iter().map(str::to_string).collect(),
            })
    }

    /// Registered names in order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl Default for BootstrapCatalog {
    fn default() -> Self {
        Self::empty().register("snapshot", load_snapshot)
    }
}

impl std::fmt::Debug for BootstrapCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapCatalog")
            .field("names", &self.names())
            .finish()
    }
}

fn load_snapshot(context: &BootstrapContext) -> Result<Box<dyn Application>> {
    Ok(Box::new(SnapshotApplication::load(
        &context.entry_point,
        context.base_url.clone(),
    )?))
}
