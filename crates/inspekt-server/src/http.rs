//! HTTP embedding.
//!
//! Every inbound request gets its own freshly assembled server: nothing is
//! shared between requests, so concurrent requests never see each other's
//! bridge, container or registry. The request is answered through
//! `SingleShotTransport`.

use crate::assembly::Serving;
use crate::error::{Error, Result};
use axum::Json;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use inspekt_mcp::protocol::parse_error;
use inspekt_mcp::{McpErrorExt, SingleShotTransport};
use serde_json::json;
use std::fmt::Display;
use std::sync::Arc;

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Default mount path.
pub const DEFAULT_PATH: &str = "/mcp";

/// Builds a fresh server for one request.
pub type ServingFactory = Arc<dyn Fn() -> Result<Serving> + Send + Sync>;

/// Mount the MCP endpoint at `path`, answering `POST` and `GET`.
///
/// `GET` reaches the transport, which answers it with 405; other methods
/// are rejected by the router itself.
pub fn router<F>(path: &str, factory: F) -> axum::Router
where
    F: Fn() -> Result<Serving> + Send + Sync + 'static,
{
    let factory: ServingFactory = Arc::new(factory);
    axum::Router::new()
        .route(path, post(handle).get(handle))
        .with_state(factory)
}

async fn handle(State(factory): State<ServingFactory>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => return unreadable(format!("unreadable body: {e}")),
    };
    let body = match String::from_utf8(body.to_vec()) {
        Ok(body) => body,
        Err(e) => return unreadable(e),
    };
    let request = http::Request::from_parts(parts, body);

    let serving = match tokio::task::spawn_blocking(move || factory()).await {
        Ok(Ok(serving)) => serving,
        Ok(Err(e)) => return failure(&e),
        Err(e) => {
            log::error!("Assembly task failed: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, Body::empty()).into_response();
        }
    };

    match serving.serve_request(request).await {
        Ok(response) => response.into_response(),
        Err(e) => failure(&e),
    }
}

/// A body that never reaches the server is still answered with a JSON-RPC
/// parse error.
fn unreadable(reason: impl Display) -> Response {
    log::warn!("Rejecting request body: {reason}");
    match SingleShotTransport::reject(parse_error(reason)) {
        Ok(response) => response.into_response(),
        Err(e) => failure(&Error::from(e)),
    }
}

fn failure(error: &Error) -> Response {
    log::error!("Request failed: {error}");
    let data = error.to_mcp_error();
    let body = json!({
        "error": {
            "code": data.code.0,
            "message": data.message,
        }
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
