//! JSON-RPC 2.0 envelope.
//!
//! Messages are decoded into and encoded from the `rmcp::model` JSON-RPC
//! types. A request without an `id` member is a notification and never gets
//! a response.

use crate::tool::Arguments;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ErrorCode, ErrorData, JsonObject, JsonRpcError,
    JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, Notification, ProtocolVersion, Request,
    RequestId, RequestOptionalParam,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;

/// MCP protocol versions the server speaks, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: [ProtocolVersion; 3] = [
    ProtocolVersion::V_2025_06_18,
    ProtocolVersion::V_2025_03_26,
    ProtocolVersion::V_2024_11_05,
];

/// Pick the version to answer `initialize` with: the client's when
/// supported, otherwise the newest.
pub fn negotiate_version(requested: &ProtocolVersion) -> ProtocolVersion {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .find(|v| *v == requested)
        .cloned()
        .unwrap_or(ProtocolVersion::V_2025_06_18)
}

/// A tool invocation: tool name plus arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct ProtocolRequest {
    /// Name of the tool to call.
    pub tool_name: String,
    /// Arguments by name.
    pub arguments: Arguments,
}

impl ProtocolRequest {
    /// Create a request.
    pub fn new(tool_name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Read `tools/call` params: `{"name": ..., "arguments": {...}}`.
    pub fn from_params(params: Option<JsonObject>) -> Result<Self, ErrorData> {
        let params =
            params.ok_or_else(|| ErrorData::invalid_params("tools/call requires params", None))?;
        let params: CallToolRequestParams =
            serde_json::from_value(Value::Object(params)).map_err(|e| {
                ErrorData::invalid_params(format!("Invalid tools/call params: {e}"), None)
            })?;

        Ok(Self::new(params.name, params.arguments.unwrap_or_default()))
    }
}

/// Outcome of one tool invocation.
pub type ProtocolResult = Result<CallToolResult, ErrorData>;

/// One decoded JSON-RPC message.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// A single request or notification.
    Single(Value),
    /// A batch of requests and notifications.
    Batch(Vec<Value>),
}

/// Decode message text; malformed JSON is a parse error.
pub fn parse_message(text: &str) -> Result<Message, ErrorData> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Ok(Message::Batch(items)),
        Ok(value) => Ok(Message::Single(value)),
        Err(e) => Err(parse_error(e)),
    }
}

/// A parse error for input that could not be read as JSON.
pub fn parse_error(reason: impl Display) -> ErrorData {
    ErrorData::parse_error(format!("Parse error: {reason}"), None)
}

/// An invalid-request error.
pub fn invalid_request(reason: impl Display) -> ErrorData {
    ErrorData::new(ErrorCode::INVALID_REQUEST, format!("Invalid request: {reason}"), None)
}

/// A request as received; params stay an untyped object until the method
/// is known.
pub type IncomingRequest = JsonRpcRequest<RequestOptionalParam<String, JsonObject>>;

/// A notification as received.
pub type IncomingNotification = JsonRpcNotification<Notification<String, JsonObject>>;

/// One element of a message, after envelope validation.
#[derive(Clone, Debug)]
pub enum Incoming {
    /// Carries an `id` and gets exactly one response.
    Request(IncomingRequest),
    /// Has no `id` and gets no response.
    Notification(IncomingNotification),
}

impl Incoming {
    /// Validate the envelope of one message element.
    ///
    /// The rejection carries the request id when one could be read.
    pub fn decode(value: Value) -> Result<Self, JsonRpcError> {
        let id = match value.get("id") {
            None => None,
            Some(id) => match serde_json::from_value::<RequestId>(id.clone()) {
                Ok(id) => Some(id),
                Err(e) => return Err(JsonRpcError::new(None, invalid_request(e))),
            },
        };

        match id {
            None => serde_json::from_value(value)
                .map(Incoming::Notification)
                .map_err(|e| JsonRpcError::new(None, invalid_request(e))),
            Some(id) => serde_json::from_value(value)
                .map(Incoming::Request)
                .map_err(|e| JsonRpcError::new(Some(id), invalid_request(e))),
        }
    }

    /// The method named by the message.
    pub fn method(&self) -> &str {
        match self {
            Incoming::Request(request) => &request.request.method,
            Incoming::Notification(notification) => &notification.notification.method,
        }
    }
}

/// A message the server sends: a response or an error.
pub type ServerMessage = JsonRpcMessage<Request, Value, Notification>;

/// Answer the request `id` with `outcome`.
pub fn answer(id: RequestId, outcome: Result<Value, ErrorData>) -> ServerMessage {
    match outcome {
        Ok(result) => ServerMessage::response(result, id),
        Err(error) => ServerMessage::error(error, Some(id)),
    }
}

/// Everything sent back for one inbound message.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// Answer to a single request, or a rejection of the whole message.
    Single(ServerMessage),
    /// Answers to the requests of a batch, in order.
    Batch(Vec<ServerMessage>),
}

impl Reply {
    /// Reject a message whose requests could not be identified.
    pub fn rejection(error: ErrorData) -> Self {
        Reply::Single(ServerMessage::error(error, None))
    }

    /// Render as JSON text.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
