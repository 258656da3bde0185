//! MCP Crypto Bot
//!
//! A Model Context Protocol server for crypto trading operations.

use rmcp::ServiceExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mcp_crypto_bot::{Config, CryptoBotServer};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging (stdout carries the MCP protocol)
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!(mode = %config.mode, "Starting MCP Crypto Bot");

    let server = CryptoBotServer::new(config)?;
    let dispatcher = server.dispatcher().clone();

    if dispatcher.gate().may_execute_live() {
        tracing::warn!("LIVE trading enabled: orders will reach the exchange");
    } else {
        tracing::info!("Trading disabled: state-changing actions run as dry runs");
    }
    dispatcher.registry().log_summary();

    dispatcher
        .notify_best_effort(&format!(
            "MCP Crypto Bot started in {} mode (trading {})",
            dispatcher.config().mode,
            if dispatcher.gate().may_execute_live() { "enabled" } else { "disabled" }
        ))
        .await;

    // Run with stdio transport
    let transport = rmcp::transport::stdio();
    let running = server.serve(transport).await?;

    // Wait for the server to finish
    running.waiting().await?;

    Ok(())
}
