use anyhow::{Context, Result};
use dotenv::dotenv;
use futures_util::StreamExt;
use momentum_rust_core::{AgentConfig, MomentumAgent};
use serde_json::json;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Momentum agent...");

    let config = AgentConfig::from_env().context("Failed to load configuration")?;
    info!(
        "Stats API: {} (timeout {:?}, chunk delay {:?})",
        config.stats_base_url, config.stats_timeout, config.chunk_delay
    );
    let agent = MomentumAgent::from_config(&config)?;

    // One query per line; an empty line gets the welcome message
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    let context = json!({});

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let mut chunks = agent.assist(&line, &context);
        while let Some(chunk) = chunks.next().await {
            stdout.write_all(chunk.text.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
        stdout.write_all(b"[DONE]\n").await?;
        stdout.flush().await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}
