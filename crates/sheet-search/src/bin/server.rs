//! Sheet search server binary
//!
//! Run with: cargo run -p sheet-search --bin sheet-search-server
//! Set SHEET_SEARCH_CONFIG to a TOML file to override the defaults.

use sheet_search::{config::SearchConfig, server::SearchServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheet_search=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                       Sheet Search                        ║
║        Semantic search over Google Sheets cells           ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config = SearchConfig::from_env()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding backend: {:?}", config.embeddings.backend);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Chunk size: {} (overlap {})", config.chunking.chunk_size, config.chunking.chunk_overlap);
    tracing::info!("  - Row offset: {}", config.indexing.row_offset);
    tracing::info!("  - Store: {}", config.store.storage_path.display());

    let server = SearchServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/index/folder - Index a Drive folder");
    println!("  POST /api/index/file   - Index one spreadsheet");
    println!("  POST /api/search       - Search cells");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
