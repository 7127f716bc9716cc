//! User toolkit catalog.
//!
//! The configuration names extra toolkits by string. The catalog maps those
//! names to constructors compiled into the binary. Unlike the built-in
//! toolkits, a configured toolkit that is unknown or fails to construct
//! stops the server.

use crate::error::{Error, Result};
use inspekt_core::ApplicationBridge;
use inspekt_mcp::Toolkit;
use std::fmt;
use std::sync::Arc;

/// Builds a toolkit from the application bridge.
pub type ToolkitConstructor =
    Arc<dyn Fn(&ApplicationBridge) -> inspekt_core::Result<Box<dyn Toolkit>> + Send + Sync>;

/// Named toolkit constructors.
#[derive(Clone, Default)]
pub struct ToolkitCatalog {
    entries: Vec<(String, ToolkitConstructor)>,
}

impl ToolkitCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor, replacing any with the same name.
    pub fn register<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&ApplicationBridge) -> inspekt_core::Result<Box<dyn Toolkit>> + Send + Sync + 'static,
    {
        let name = name.into();
        let constructor: ToolkitConstructor = Arc::new(constructor);
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = constructor,
            None => self.entries.push((name, constructor)),
        }
        self
    }

    /// Registered names in order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Construct the toolkit registered under `name`.
    pub fn construct(&self, name: &str, bridge: &ApplicationBridge) -> Result<Box<dyn Toolkit>> {
        let (_, constructor) = self
            .entries
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| Error::UnknownToolkit {
                name: name.to_string(),
                registered: self.names().into_iter().map(str::to_string).collect(),
            })?;

        constructor(bridge).map_err(|source| Error::ToolkitConstruction {
            name: name.to_string(),
            source,
        })
    }
}

impl fmt::Debug for ToolkitCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolkitCatalog")
            .field("names", &self.names())
            .finish()
    }
}
