//! Summarizer server binary
//!
//! Run with: cargo run -p workbench-summarizer --bin workbench-summarizer-server

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workbench_summarizer::{config::AppConfig, server::SummarizerServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env();

    tracing::info!("Configuration loaded");
    tracing::info!("  - Backend: {:?}", config.backend);
    tracing::info!(
        "  - Processor: {}",
        config
            .summarizer
            .processor_name()
            .unwrap_or_else(|e| format!("<unavailable: {}>", e))
    );
    tracing::info!("  - Location: {}", config.summarizer.location);
    tracing::info!("  - Field mask: {}", config.summarizer.field_mask);
    tracing::info!(
        "  - Output prefix: {}",
        config.summarizer.gcs_output_uri.as_deref().unwrap_or("<unset>")
    );
    match config.summarizer.table_ref() {
        Ok(table) => tracing::info!("  - Destination table: {}", table),
        Err(e) => tracing::warn!("  - Destination table unavailable: {}", e),
    }

    let server = SummarizerServer::new(config).await?;

    tracing::info!("Endpoints:");
    tracing::info!("  POST /on_upload         - storage upload events");
    tracing::info!("  POST /on_output         - processor output events");
    tracing::info!("  GET  /operations/*name  - inspect batch operation outputs");
    tracing::info!("  GET  /health");

    server.start().await?;

    Ok(())
}

/// `RUST_LOG` filter with a fmt layer; `LOG_FORMAT=json` for structured output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "workbench_summarizer=info,tower_http=info".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
