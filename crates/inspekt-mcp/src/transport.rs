//! Transports.
//!
//! A [`Transport`] connects a [`ProtocolServer`] to a channel:
//!
//! - [`StreamTransport`]: newline-delimited JSON-RPC over a byte stream,
//!   one message per line, until end of input. Used over stdin/stdout.
//! - [`SingleShotTransport`]: exactly one HTTP request in, one HTTP
//!   response out. The embedding web server owns sockets and timeouts.

use crate::error::Result;
use crate::protocol::{Reply, parse_error, parse_message};
use crate::server::ProtocolServer;
use async_trait::async_trait;
use http::{Method, Request, Response, StatusCode, header};
use rmcp::model::ErrorData;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

/// A channel a [`ProtocolServer`] can be served over.
#[async_trait]
pub trait Transport: Send {
    /// What serving produces.
    type Output;

    /// Drive the exchange until the channel is done.
    async fn serve(self, server: &ProtocolServer) -> Result<Self::Output>;
}

// ============================================================================
// StreamTransport
// ============================================================================

/// Newline-delimited JSON-RPC over a reader and a writer.
///
/// Each line is fully answered, and the answer flushed, before the next
/// line is read. Blank lines are skipped; a line that is not UTF-8 is
/// answered with a parse error like any other malformed message. The
/// output is the number of messages handled.
pub struct StreamTransport<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> StreamTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Serve over the given reader and writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl StreamTransport<BufReader<Stdin>, Stdout> {
    /// Serve over the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

#[async_trait]
impl<R, W> Transport for StreamTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    type Output = usize;

    async fn serve(self, server: &ProtocolServer) -> Result<usize> {
        let Self {
            mut reader,
            mut writer,
        } = self;
        let mut line = Vec::new();
        let mut handled = 0;

        log::info!("Serving {} tools over stream", server.registry().len());
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).await? == 0 {
                break;
            }

            let reply = match std::str::from_utf8(&line) {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => server.handle_text(text).await,
                Err(e) => {
                    log::warn!("Received a line that is not UTF-8: {e}");
                    Some(Reply::rejection(parse_error(e)))
                }
            };
            handled += 1;

            if let Some(reply) = reply {
                let mut bytes = serde_json::to_vec(&reply)?;
                bytes.push(b'\n');
                writer.write_all(&bytes).await?;
                writer.flush().await?;
            }
        }

        log::info!("Stream closed after {handled} messages");
        Ok(handled)
    }
}

// ============================================================================
// SingleShotTransport
// ============================================================================

/// One HTTP request answered with one HTTP response.
///
/// - anything but `POST`: 405 with `Allow: POST`
/// - a body that is not JSON: 400 with a JSON-RPC parse error
/// - only notifications: 202 with an empty body
/// - otherwise: 200 with the JSON-RPC response(s)
pub struct SingleShotTransport {
    request: Request<String>,
}

impl SingleShotTransport {
    /// Wrap an inbound request.
    pub fn new(request: Request<String>) -> Self {
        Self { request }
    }

    /// The 400 response for a body that cannot be decoded.
    pub fn reject(error: ErrorData) -> Result<Response<String>> {
        json_response(StatusCode::BAD_REQUEST, &Reply::rejection(error))
    }
}

#[async_trait]
impl Transport for SingleShotTransport {
    type Output = Response<String>;

    async fn serve(self, server: &ProtocolServer) -> Result<Response<String>> {
        if self.request.method() != Method::POST {
            return Ok(Response::builder()
                .status(StatusCode::METHOD_NOT_ALLOWED)
                .header(header::ALLOW, "POST")
                .body(String::new())?);
        }

        let message = match parse_message(self.request.body()) {
            Ok(message) => message,
            Err(error) => return Self::reject(error),
        };

        match server.handle_message(message).await {
            Some(reply) => json_response(StatusCode::OK, &reply),
            None => Ok(Response::builder()
                .status(StatusCode::ACCEPTED)
                .body(String::new())?),
        }
    }
}

fn json_response(status: StatusCode, reply: &Reply) -> Result<Response<String>> {
    Ok(Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(reply.to_json()?)?)
}

// ============================================================================
// Tests
// ============================================================================
