//! Database access for cytoscan-sa

pub mod results;
pub mod settings;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Connects to cytoscan.db in the root folder, creating it if missing.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Initialize cytoscan-sa tables
///
/// Creates the analysis_results and settings tables if they don't exist.
/// Public so integration tests can apply the schema to in-memory pools.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    // Settings table for parameter persistence
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Analysis result records, one row per analysis pass
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analysis_results (
            id TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            media_type TEXT NOT NULL,
            sperm_count INTEGER NOT NULL DEFAULT 0,
            speed_avg REAL NOT NULL DEFAULT 0.0,
            motility REAL NOT NULL DEFAULT 0.0,
            morphology TEXT NOT NULL DEFAULT '{}',
            concentration REAL NOT NULL DEFAULT 0.0,
            total_motile_count INTEGER NOT NULL DEFAULT 0,
            processing_time_seconds INTEGER NOT NULL DEFAULT 0,
            movement_pattern TEXT NOT NULL DEFAULT '{}',
            confidence_score REAL NOT NULL DEFAULT 0.0,
            analysis_status TEXT NOT NULL,
            media_url TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (settings, analysis_results)");

    Ok(())
}
