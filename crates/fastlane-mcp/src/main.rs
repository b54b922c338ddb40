//! fastlane-mcp: MCP server binary for fastlane builds.
//!
//! # Transport: stdio only
//!
//! stdout carries the MCP protocol, so all logging goes to stderr.
//!
//! # Usage
//!
//! ```bash
//! fastlane-mcp
//! fastlane-mcp --config ./fastlane-mcp.toml
//! ```
//!
//! Without `--config`, configuration comes from `$FASTLANE_MCP_CONFIG` or
//! `$XDG_CONFIG_HOME/fastlane-mcp/config.toml`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use rmcp::service::ServiceExt;
use rmcp::transport::io::stdio;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use fastlane_mcp::server::{FastlaneServerHandler, McpServerConfig};

/// MCP server for building iOS and Android apps with fastlane.
#[derive(Parser, Debug)]
#[command(name = "fastlane-mcp", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // If OTEL_EXPORTER_OTLP_ENDPOINT is set, export spans via OTLP.
    // Otherwise, just use the fmt layer (no-op OTel).
    let provider = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .build()
            .context("Failed to build OTLP exporter")?;
        let resource = Resource::builder()
            .with_attributes([
                KeyValue::new("service.name", "fastlane-mcp"),
                KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            ])
            .build();
        let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
            .with_resource(resource)
            .with_batch_exporter(exporter)
            .build();
        opentelemetry::global::set_tracer_provider(provider.clone());
        Some(provider)
    } else {
        None
    };

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("fastlane-mcp")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(otel_layer)
        .with(
            EnvFilter::from_default_env()
                .add_directive("fastlane_mcp=info".parse()?)
                .add_directive("fastlane_kernel=info".parse()?),
        )
        .init();

    tracing::info!("Starting fastlane MCP server");

    let config = match cli.config {
        Some(ref path) => McpServerConfig::load_from(path),
        None => McpServerConfig::load(),
    }
    .context("Failed to load configuration")?;

    tracing::info!(
        "Server config: name={}, version={}, fastlane_command={}",
        config.name,
        config.version,
        config.fastlane_command
    );

    let handler = FastlaneServerHandler::new(config);

    tracing::info!("Serving on stdio");

    let service = handler
        .serve(stdio())
        .await
        .context("Failed to start MCP service")?;

    service.waiting().await?;

    tracing::info!("Server shutdown complete");

    if let Some(provider) = provider {
        // Explicitly ignored: shutdown errors are non-fatal at process exit
        let _ = provider.shutdown();
    }

    Ok(())
}
