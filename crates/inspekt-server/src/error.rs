//! Error types for inspekt-server
//!
//! Every variant is fatal: the process exits non-zero, or the HTTP request
//! is answered with a 500.

use inspekt_mcp::McpErrorExt;
use inspekt_mcp::model::{ErrorCode, ErrorData};
use thiserror::Error;

/// Result type alias for inspekt-server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop the server from starting or serving.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The configuration file exists but cannot be used.
    #[error("Failed to load configuration: {0}")]
    Config(#[source] inspekt_core::Error),

    /// The application entry point could not be loaded.
    #[error("Failed to boot application: {0}")]
    Bootstrap(#[source] inspekt_core::Error),

    /// A configured toolkit name is not in the catalog.
    #[error("Unknown toolkit '{name}' (registered: {})", registered.join(", "))]
    UnknownToolkit {
        /// Configured name
        name: String,
        /// Names the catalog knows
        registered: Vec<String>,
    },

    /// A configured toolkit failed to construct.
    #[error("Toolkit '{name}' failed to construct: {source}")]
    ToolkitConstruction {
        /// Toolkit name
        name: String,
        /// Underlying failure
        #[source]
        source: inspekt_core::Error,
    },

    /// Two toolkits registered the same tool name under the reject policy.
    #[error("Duplicate tool '{name}'")]
    DuplicateTool {
        /// The repeated name
        name: String,
    },

    /// The transport failed while serving.
    #[error("Transport error: {0}")]
    Transport(#[source] inspekt_mcp::Error),
}

impl From<inspekt_mcp::Error> for Error {
    fn from(err: inspekt_mcp::Error) -> Self {
        match err {
            inspekt_mcp::Error::DuplicateTool { name } => Error::DuplicateTool { name },
            other => Error::Transport(other),
        }
    }
}

impl McpErrorExt for Error {
    fn to_mcp_error(&self) -> ErrorData {
        match self {
            Error::Config(_) | Error::UnknownToolkit { .. } => {
                ErrorData::new(ErrorCode::INVALID_REQUEST, self.to_string(), None)
            }
            _ => ErrorData::internal_error(self.to_string(), None),
        }
    }
}
