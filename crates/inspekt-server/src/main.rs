//! `inspekt` binary.
//!
//! Logs go to stderr so stdout stays free for the stdio transport.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inspekt_server::{ServerAssembly, assemble, base_dir_of};
use std::path::PathBuf;

/// Inspekt - MCP introspection server
#[derive(Parser, Debug)]
#[command(name = "inspekt")]
#[command(
    about = "Expose an application's services, schema and routes over MCP",
    long_about = None
)]
struct Args {
    /// Configuration file path (default: ./mcp-config.toml)
    #[arg(short, long, env = "INSPEKT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory relative paths are resolved against
    #[arg(short, long)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve one session over stdin/stdout (default)
    Stdio,
    /// Serve over HTTP, one fresh server per request
    #[cfg(feature = "http")]
    Http {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,

        /// Path the endpoint is mounted at
        #[arg(long, default_value = inspekt_server::http::DEFAULT_PATH)]
        path: String,
    },
}

impl Args {
    fn assembly(&self) -> ServerAssembly {
        let base_dir = match (&self.base_dir, &self.config) {
            (Some(dir), _) => dir.clone(),
            (None, Some(config)) => base_dir_of(config),
            (None, None) => PathBuf::from("."),
        };
        let assembly = ServerAssembly::new().with_base_dir(base_dir);
        match &self.config {
            Some(config) => assembly.with_config_path(config),
            None => assembly,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,inspekt=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let assembly = args.assembly();

    match args.command.unwrap_or(Command::Stdio) {
        Command::Stdio => {
            let serving = assemble(assembly).context("Failed to assemble server")?;
            let handled = serving.serve_stdio().await?;
            tracing::info!(messages = handled, "Input closed");
        }
        #[cfg(feature = "http")]
        Command::Http { bind, path } => {
            // Fail fast on a broken setup instead of on the first request.
            assemble(assembly.clone()).context("Failed to assemble server")?;

            let app = inspekt_server::http::router(&path, move || assemble(assembly.clone()));
            let listener = tokio::net::TcpListener::bind(&bind)
                .await
                .with_context(|| format!("Failed to bind {bind}"))?;
            tracing::info!(address = %bind, path = %path, "Listening");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
