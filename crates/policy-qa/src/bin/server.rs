//! Policy server binary
//!
//! Run with: cargo run -p policy-qa --bin policy-qa-server

use std::path::PathBuf;

use policy_qa::{config::AppConfig, server::PolicyServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "policy_qa=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::var_os("POLICY_QA_CONFIG").map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Provider: {}", config.llm.base_url);
    tracing::info!("  - Model: {}", config.llm.model);
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!(
        "  - Sessions: idle TTL {}s, at most {}",
        config.server.session_ttl_secs,
        config.server.max_sessions
    );
    if config.llm.api_key.is_none() {
        tracing::warn!("No server-wide API key; uploads must include an 'api_key' field");
    }

    let server = PolicyServer::new(config);

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
