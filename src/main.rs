// MCP stdio server: SearXNG web search and headless-browser page content.
//
// stdout carries the protocol, so all logging goes to stderr.

use anyhow::{Context, Result};
use kodegen_tools_searxng::{
    ContentFetcher, ReadinessManager, SearchClient, SearxngServer, ServerConfig, ToolDispatcher,
    chromium_factory,
};
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    // a panic inside run() surfaces as a JoinError instead of unwinding out of main
    match tokio::spawn(run()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!("Fatal error running server: {:#}", e);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Server task aborted: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<()> {
    let config = ServerConfig::from_env().context("Invalid configuration")?;
    info!(
        "Starting {} {} (SearXNG at {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.searxng_url()
    );

    let (scraper, init_task) =
        ReadinessManager::new(config.scraper().clone(), config.retry(), chromium_factory()).spawn();

    let search = SearchClient::new(config.searxng_url().clone());
    let fetcher = ContentFetcher::new(scraper.clone()).with_timeout(config.fetch_timeout());
    let server = SearxngServer::new(ToolDispatcher::new(search, fetcher, scraper.clone()));

    let service = server
        .serve(stdio())
        .await
        .context("Failed to start MCP stdio transport")?;
    info!("MCP server running on stdio");

    tokio::select! {
        quit = service.waiting() => {
            let reason = quit.context("MCP service terminated abnormally")?;
            info!("MCP session ended: {:?}", reason);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
        }
    }

    init_task.abort();
    if let Some(backend) = scraper.backend()
        && let Err(e) = backend.shutdown().await
    {
        warn!("Failed to shut down browser: {:#}", e);
    }

    info!("Server stopped");
    Ok(())
}
