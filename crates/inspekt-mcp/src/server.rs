//! Protocol server.
//!
//! [`ProtocolServer`] answers JSON-RPC messages against a frozen
//! [`ToolRegistry`]. Transports feed it messages; it never owns a socket or
//! a stream itself.

use crate::error::{Result, ToolError};
use crate::protocol::{
    Incoming, Message, ProtocolRequest, ProtocolResult, Reply, ServerMessage, answer,
    invalid_request, negotiate_version, parse_message,
};
use crate::registry::ToolRegistry;
use crate::tool::domain_error;
use crate::transport::Transport;
use crate::validate::validate_arguments;
use futures::FutureExt;
use rmcp::model::{
    CallToolResult, Content, EmptyResult, ErrorCode, ErrorData, Implementation,
    InitializeRequestParams, InitializeResult, JsonObject, JsonRpcMessage, ListToolsResult,
    ServerCapabilities,
};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Server metadata reported by `initialize`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
    /// Usage hints for the client.
    pub instructions: Option<String>,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "inspekt".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: None,
        }
    }
}

/// JSON-RPC front end of a tool registry.
#[derive(Clone, Debug)]
pub struct ProtocolServer {
    registry: Arc<ToolRegistry>,
    info: ServerInfo,
}

impl ProtocolServer {
    /// Freeze `registry` behind a server.
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            info: ServerInfo::default(),
        }
    }

    /// Set the server metadata.
    pub fn with_info(mut self, info: ServerInfo) -> Self {
        self.info = info;
        self
    }

    /// Set the server name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.info.name = name.into();
        self
    }

    /// The registry being served.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Server metadata.
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Serve through `transport` until it completes.
    pub async fn run<T: Transport>(&self, transport: T) -> Result<T::Output> {
        transport.serve(self).await
    }

    /// Answer message text. Malformed JSON is answered with a parse error;
    /// `None` means there is nothing to send back.
    pub async fn handle_text(&self, text: &str) -> Option<Reply> {
        match parse_message(text) {
            Ok(message) => self.handle_message(message).await,
            Err(error) => Some(Reply::rejection(error)),
        }
    }

    /// Answer a decoded message. Batches are answered with an array of the
    /// responses to their requests.
    pub async fn handle_message(&self, message: Message) -> Option<Reply> {
        match message {
            Message::Single(value) => self.handle_value(value).await.map(Reply::Single),
            Message::Batch(items) if items.is_empty() => {
                Some(Reply::rejection(invalid_request("empty batch")))
            }
            Message::Batch(items) => {
                let mut responses = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(response) = self.handle_value(item).await {
                        responses.push(response);
                    }
                }
                (!responses.is_empty()).then_some(Reply::Batch(responses))
            }
        }
    }

    async fn handle_value(&self, value: Value) -> Option<ServerMessage> {
        match Incoming::decode(value) {
            Ok(Incoming::Request(request)) => {
                let outcome = self
                    .dispatch(&request.request.method, request.request.params)
                    .await;
                Some(answer(request.id, outcome))
            }
            Ok(Incoming::Notification(notification)) => {
                log::debug!("Received '{}'", notification.notification.method);
                None
            }
            Err(rejection) => Some(JsonRpcMessage::Error(rejection)),
        }
    }

    async fn dispatch(
        &self,
        method: &str,
        params: Option<JsonObject>,
    ) -> std::result::Result<Value, ErrorData> {
        log::debug!("Dispatching '{method}'");
        match method {
            "initialize" => encode(self.initialize(params)?),
            "ping" => encode(EmptyResult {}),
            "tools/list" => encode(ListToolsResult::with_all_items(self.registry.tools())),
            "tools/call" => {
                let call = ProtocolRequest::from_params(params)?;
                encode(self.call_tool(call).await?)
            }
            method if method.starts_with("notifications/") => Ok(Value::Null),
            method => Err(ErrorData::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Method not found: {method}"),
                None,
            )),
        }
    }

    fn initialize(
        &self,
        params: Option<JsonObject>,
    ) -> std::result::Result<InitializeResult, ErrorData> {
        let params: InitializeRequestParams =
            serde_json::from_value(Value::Object(params.unwrap_or_default())).map_err(|e| {
                ErrorData::invalid_params(format!("Invalid initialize params: {e}"), None)
            })?;
        log::debug!(
            "Initializing for client '{}' {} ({})",
            params.client_info.name,
            params.client_info.version,
            params.protocol_version
        );

        let capabilities = ServerCapabilities::builder().enable_tools().build();
        let server_info = Implementation::new(self.info.name.as_str(), self.info.version.as_str());
        let result = InitializeResult::new(capabilities)
            .with_server_info(server_info)
            .with_protocol_version(negotiate_version(&params.protocol_version));
        Ok(match &self.info.instructions {
            Some(instructions) => result.with_instructions(instructions.as_str()),
            None => result,
        })
    }

    /// Run one tool invocation.
    ///
    /// Unknown tools and invalid arguments are protocol errors and the
    /// handler is not started. Everything the handler does, including
    /// failing or panicking, ends in a successful result whose text is the
    /// JSON the handler produced or an `{"error": ...}` payload.
    pub async fn call_tool(&self, request: ProtocolRequest) -> ProtocolResult {
        let ProtocolRequest {
            tool_name,
            arguments,
        } = request;
        let name = tool_name.as_str();
        let Some(definition) = self.registry.lookup(name) else {
            return Err(ErrorData::invalid_params(format!("Unknown tool: {name}"), None));
        };
        validate_arguments(definition, &arguments)?;

        let started =
            std::panic::catch_unwind(AssertUnwindSafe(move || definition.invoke(arguments)));
        let outcome = match started {
            Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
            Err(panic) => Err(panic),
        };

        let value = match outcome {
            Ok(Ok(value)) => value,
            Ok(Err(ToolError::InvalidArguments(message))) => {
                return Err(ErrorData::invalid_params(
                    format!("Invalid arguments for tool '{name}': {message}"),
                    None,
                ));
            }
            Ok(Err(error)) => {
                log::warn!("Tool '{name}' failed: {error}");
                domain_error(error.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                log::warn!("Tool '{name}' panicked: {message}");
                domain_error(message)
            }
        };

        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

fn encode<T: Serialize>(result: T) -> std::result::Result<Value, ErrorData> {
    serde_json::to_value(result).map_err(|e| ErrorData::internal_error(e.to_string(), None))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool handler panicked".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
