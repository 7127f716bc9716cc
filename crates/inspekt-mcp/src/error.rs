//! Error types for inspekt-mcp

use rmcp::model::{ErrorCode, ErrorData};
use thiserror::Error;

/// Result type alias for inspekt-mcp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a registry or driving a transport.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A tool name was registered twice under [`DuplicatePolicy::Reject`].
    ///
    /// [`DuplicatePolicy::Reject`]: crate::registry::DuplicatePolicy::Reject
    #[error("Duplicate tool '{name}'")]
    DuplicateTool {
        /// The repeated name
        name: String,
    },

    /// Reading from or writing to the transport failed.
    #[error("Transport error: {0}")]
    Io(#[from] std::io::Error),

    /// A response could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An HTTP response could not be built.
    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),
}

/// Failure reported by a tool handler.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Arguments could not be bound to the handler's parameters.
    ///
    /// Reported to the caller as a protocol error.
    #[error("{0}")]
    InvalidArguments(String),

    /// The inspected application reported an error.
    #[error(transparent)]
    Core(#[from] inspekt_core::Error),

    /// Any other handler failure.
    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    /// Creates a generic handler failure.
    pub fn failed(message: impl Into<String>) -> Self {
        ToolError::Failed(message.into())
    }
}

/// Conversion of core errors into MCP protocol errors.
pub trait McpErrorExt {
    /// Map to an `rmcp` error with the matching JSON-RPC code.
    fn to_mcp_error(&self) -> ErrorData;
}

impl McpErrorExt for inspekt_core::Error {
    fn to_mcp_error(&self) -> ErrorData {
        use inspekt_core::Error as CoreError;

        let code = match self {
            CoreError::InvalidUrl { .. } | CoreError::InvalidLink(_) => ErrorCode::INVALID_PARAMS,
            CoreError::ServiceNotFound(_)
            | CoreError::TypeNotFound(_)
            | CoreError::TableNotFound(_) => ErrorCode::RESOURCE_NOT_FOUND,
            _ => ErrorCode::INTERNAL_ERROR,
        };
        ErrorData::new(code, self.to_string(), None)
    }
}

impl McpErrorExt for Error {
    fn to_mcp_error(&self) -> ErrorData {
        ErrorData::internal_error(self.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_codes() {
        let e = inspekt_core::Error::TableNotFound("x".into()).to_mcp_error();
        assert_eq!(e.code, ErrorCode::RESOURCE_NOT_FOUND);
        assert_eq!(e.message, "Table 'x' does not exist");

        let e = inspekt_core::Error::invalid_link("bad").to_mcp_error();
        assert_eq!(e.code, ErrorCode::INVALID_PARAMS);

        let e = inspekt_core::Error::config("broken").to_mcp_error();
        assert_eq!(e.code, ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_tool_error_display() {
        assert_eq!(ToolError::failed("boom").to_string(), "boom");
        let core: ToolError = inspekt_core::Error::ServiceNotFound("db".into()).into();
        assert_eq!(core.to_string(), "Service 'db' not found");
    }
}
