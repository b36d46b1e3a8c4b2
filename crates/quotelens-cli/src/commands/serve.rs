//! `qlens serve` -- start the upload form and JSON API.
//!
//! Loads the configuration, artifact bundle and model up front. A broken
//! bundle aborts startup; once serving, rejected uploads never stop the
//! process.
//!
//! # Example
//!
//! ```text
//! qlens serve --config demos/quotelens.json --port 8080
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tokio::net::TcpListener;
use tracing::info;

use quotelens_services::{ApiState, build_router, serve};

use super::load_service;

/// Arguments for the `qlens serve` subcommand.
#[derive(Args)]
pub struct ServeArgs {
    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,

    /// Bind host (overrides `server.host`).
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides `server.port`).
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Run the serve command.
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let (mut config, service) = load_service(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        features = service.bundle().feature_schema().len(),
        max_upload_bytes = config.server.max_upload_bytes,
        "quotelens ready"
    );
    let router = build_router(ApiState::new(Arc::new(service)), &config.server);
    serve(listener, router).await?;
    Ok(())
}
