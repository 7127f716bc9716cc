//! Tool definitions.
//!
//! A [`ToolDefinition`] pairs the `rmcp` [`Tool`] metadata advertised in
//! `tools/list` with the handler that runs on `tools/call`. Handlers take
//! the raw argument object and resolve to a JSON value; domain errors are
//! ordinary values built with [`domain_error`].

use crate::error::ToolError;
use rmcp::model::{Tool, ToolAnnotations};
use schemars::{JsonSchema, schema_for};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Arguments of one tool call.
pub type Arguments = Map<String, Value>;

/// Future returned by a tool handler.
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send>>;

/// A bound tool handler.
pub type ToolHandler = Arc<dyn Fn(Arguments) -> ToolFuture + Send + Sync>;

/// A named, schema-described operation and its handler.
#[derive(Clone)]
pub struct ToolDefinition {
    tool: Tool,
    handler: ToolHandler,
}

impl ToolDefinition {
    /// Create a definition from prepared metadata and a raw handler.
    pub fn new(tool: Tool, handler: ToolHandler) -> Self {
        Self { tool, handler }
    }

    /// Create a definition whose arguments are bound to `A` with serde.
    ///
    /// The input schema is generated from `A`; field doc comments become
    /// parameter descriptions and `Option` fields are optional. Arguments
    /// that do not deserialize into `A` fail with
    /// [`ToolError::InvalidArguments`].
    pub fn typed<A, F, Fut>(name: &str, description: &str, handler: F) -> Self
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let tool = make_tool(name, description, schema_for_args::<A>());
        let handler: ToolHandler = Arc::new(move |args: Arguments| -> ToolFuture {
            match serde_json::from_value::<A>(Value::Object(args)) {
                Ok(bound) => Box::pin(handler(bound)),
                Err(e) => Box::pin(std::future::ready(Err(ToolError::InvalidArguments(
                    e.to_string(),
                )))),
            }
        });
        Self { tool, handler }
    }

    /// Mark the tool read-only, idempotent, non-destructive and closed-world.
    pub fn read_only(mut self) -> Self {
        self.tool.annotations = Some(
            ToolAnnotations::new()
                .read_only(true)
                .destructive(false)
                .idempotent(true)
                .open_world(false),
        );
        self
    }

    /// Tool name.
    pub fn name(&self) -> &str {
        self.tool.name.as_ref()
    }

    /// Metadata advertised to callers.
    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    /// JSON Schema of the arguments.
    pub fn input_schema(&self) -> &Map<String, Value> {
        &self.tool.input_schema
    }

    /// Start the handler.
    pub fn invoke(&self, args: Arguments) -> ToolFuture {
        (self.handler)(args)
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Payload of a tool that ran but found nothing usable: `{"error": message}`.
pub fn domain_error(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

/// Turn a response struct into a handler result.
pub fn serialize_response<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value)
        .map_err(|e| ToolError::failed(format!("Failed to encode response: {e}")))
}

/// Build `rmcp` tool metadata.
pub fn make_tool(name: &str, description: &str, input_schema: Arc<Map<String, Value>>) -> Tool {
    Tool::new(name.to_string(), description.to_string(), input_schema)
}

/// Generate the input schema for an argument struct.
pub fn schema_for_args<A: JsonSchema>() -> Arc<Map<String, Value>> {
    let mut schema = match serde_json::to_value(schema_for!(A)) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    schema.remove("$schema");
    schema.remove("title");
    schema
        .entry("type")
        .or_insert_with(|| Value::String("object".to_string()));
    schema
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    Arc::new(schema)
}
