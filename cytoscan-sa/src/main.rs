//! cytoscan-sa - Sample Analysis Microservice
//!
//! **Module Identity:**
//! - Name: cytoscan-sa (Sample Analysis)
//! - Port: 5731
//!
//! Accepts video/image uploads, runs the byte-signal heuristic analysis
//! pipeline over them, and persists result records to the shared
//! CytoScan database. Clients integrate via HTTP REST + SSE.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cytoscan_common::events::EventBus;
use cytoscan_sa::storage::MediaStore;
use cytoscan_sa::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting cytoscan-sa (Sample Analysis) microservice");
    info!("Port: 5731");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Step 1: Resolve root folder (CLI arg > env > TOML > OS default)
    let cli_root = std::env::args().nth(1);
    let root_folder =
        cytoscan_common::config::resolve_root_folder(cli_root.as_deref(), "CYTOSCAN_ROOT_FOLDER")
            .map_err(|e| anyhow::anyhow!("Failed to resolve root folder: {}", e))?;

    // Step 2: Create root folder directory if missing
    cytoscan_common::config::ensure_root_folder(&root_folder)
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;

    // Step 3: Open or create database
    let db_path = cytoscan_common::config::database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let db_pool = cytoscan_sa::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    // Media store for uploaded payloads, served back under /media
    let media = MediaStore::new(root_folder.join("media"));
    media
        .ensure_buckets()
        .map_err(|e| anyhow::anyhow!("Failed to initialize media store: {}", e))?;
    info!("Media store: {}", media.root().display());

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100); // 100 event capacity
    info!("Event bus initialized");

    // Create application state
    let state = AppState::new(db_pool, event_bus, media);

    // Build router
    let app = cytoscan_sa::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind("127.0.0.1:5731").await?;
    info!("Listening on http://127.0.0.1:5731");
    info!("Health check: http://127.0.0.1:5731/health");

    axum::serve(listener, app).await?;

    Ok(())
}
