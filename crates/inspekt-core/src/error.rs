//! Error types for inspekt-core

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for inspekt-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bridging into an inspected application.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Configuration file could not be parsed or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O failure tied to a specific path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path that was being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The application entry point could not be loaded.
    #[error("Bootstrap error: {0}")]
    Bootstrap(String),

    /// No bootstrap is registered under the configured name.
    #[error("Unknown bootstrap '{name}' (registered: {})", registered.join(", "))]
    UnknownBootstrap {
        /// Requested bootstrap name
        name: String,
        /// Names that are registered
        registered: Vec<String>,
    },

    /// Named service is not present in the container.
    #[error("Service '{0}' not found")]
    ServiceNotFound(String),

    /// Named service exists but holds a different type.
    #[error("Service '{name}' is not of type {expected}")]
    ServiceType {
        /// Service name
        name: String,
        /// Requested type
        expected: &'static str,
    },

    /// No autowired service of the requested type.
    #[error("Service of type {0} not found")]
    TypeNotFound(&'static str),

    /// More than one autowired service matches the requested type.
    #[error("Multiple services of type {type_name} found: {}", candidates.join(", "))]
    AmbiguousType {
        /// Requested type
        type_name: &'static str,
        /// Names of all matching services
        candidates: Vec<String>,
    },

    /// Table is not part of the database structure.
    #[error("Table '{0}' does not exist")]
    TableNotFound(String),

    /// URL could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// Route mask could not be compiled.
    #[error("Invalid route mask '{mask}': {reason}")]
    InvalidRoute {
        /// The offending mask
        mask: String,
        /// What is wrong with it
        reason: String,
    },

    /// Link destination is malformed or no route produces it.
    #[error("Invalid link: {0}")]
    InvalidLink(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates a bootstrap error.
    pub fn bootstrap(message: impl Into<String>) -> Self {
        Error::Bootstrap(message.into())
    }

    /// Wraps an I/O error with the path it occurred on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates an invalid-link error.
    pub fn invalid_link(message: impl Into<String>) -> Self {
        Error::InvalidLink(message.into())
    }

    /// Whether this error means "the thing asked for is not there", as
    /// opposed to a broken application.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ServiceNotFound(_) | Error::TypeNotFound(_) | Error::TableNotFound(_)
        )
    }
}
