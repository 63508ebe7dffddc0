//! MCP Server entry point for Support Buddy
//!
//! Starts the MCP server with stdio transport. Configuration is read once at
//! startup; AI ticket analysis is enabled only when a Gemini API key is set.

mod config;
mod schemas;
mod server;

use std::process::ExitCode;

use config::{AppConfig, Capabilities};
use rmcp::ServiceExt;
use server::SupportBuddyMcp;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing to stderr (MCP uses stdout for protocol)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    tracing::info!("Starting Support Buddy MCP Server");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let capabilities = Capabilities::detect(&config);
    if capabilities.ai_enabled {
        tracing::info!(
            "AI ticket analysis enabled (model {}, {} calls per {}s)",
            config.gemini_model,
            config.ai_max_calls,
            config.ai_window_secs
        );
    } else {
        tracing::warn!("No Gemini API key configured; tickets are classified with keyword rules only");
    }

    let mcp_server = match SupportBuddyMcp::from_config(&config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to initialize MCP server: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        "MCP server initialized (AI analysis: {})",
        if mcp_server.capabilities().ai_enabled { "on" } else { "off" }
    );

    // Start serving via stdio
    tracing::info!("Starting MCP server on stdio transport");
    let service = match mcp_server.serve(rmcp::transport::stdio()).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start MCP server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Wait for the server to complete
    if let Err(e) = service.waiting().await {
        tracing::error!("MCP server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
