//! Inspector configuration.
//!
//! The configuration is a small TOML file, `mcp-config.toml` by default,
//! living next to the inspected application:
//!
//! ```toml
//! bootstrap = "app/inspekt.json"
//! bootstrapClass = "snapshot"
//! toolkits = ["orders"]
//! baseUrl = "https://shop.example.com/"
//! ```
//!
//! A missing file is not an error: it yields [`InspectorConfig::default`],
//! which starts the server with the built-in toolkits only.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "mcp-config.toml";

/// Environment variable that overrides the configuration path.
pub const CONFIG_ENV_VAR: &str = "INSPEKT_CONFIG";

/// Default application entry point, relative to the base directory.
pub const DEFAULT_BOOTSTRAP: &str = "app/inspekt.json";

/// Default bootstrap name.
pub const DEFAULT_BOOTSTRAP_CLASS: &str = "snapshot";

/// Default base URL used for generated links.
pub const DEFAULT_BASE_URL: &str = "http://localhost/";

/// Inspector configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InspectorConfig {
    /// Path to the application entry point.
    pub bootstrap: String,

    /// Name of the bootstrap that knows how to load the entry point.
    #[serde(rename = "bootstrapClass", alias = "bootstrap_class")]
    pub bootstrap_class: String,

    /// Additional toolkits, in load order.
    pub toolkits: Vec<String>,

    /// Base URL for links produced by the link generator.
    #[serde(rename = "baseUrl", alias = "base_url")]
    pub base_url: String,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            bootstrap: DEFAULT_BOOTSTRAP.to_string(),
            bootstrap_class: DEFAULT_BOOTSTRAP_CLASS.to_string(),
            toolkits: Vec::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl InspectorConfig {
    /// Resolve which file to read.
    ///
    /// Precedence: explicit path, then `INSPEKT_CONFIG`, then
    /// `mcp-config.toml` inside `base_dir`.
    pub fn resolve_path(explicit: Option<&Path>, base_dir: &Path) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => base_dir.join(DEFAULT_CONFIG_FILE),
        }
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "No configuration at {}, using built-in toolkits only",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        if config.bootstrap.trim().is_empty() {
            return Err(Error::config("'bootstrap' must not be empty"));
        }
        if config.bootstrap_class.trim().is_empty() {
            return Err(Error::config("'bootstrapClass' must not be empty"));
        }
        Ok(config)
    }

    /// Entry point path, resolved against `base_dir` when relative.
    pub fn bootstrap_path(&self, base_dir: &Path) -> PathBuf {
        let path = Path::new(&self.bootstrap);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
