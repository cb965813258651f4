//! Analysis result database operations
//!
//! The result store: insert, most-recent-first query, single-record get,
//! and delete over the analysis_results table.

use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use cytoscan_common::{Error, Result};

use crate::models::{AnalysisRecord, MorphologyBreakdown, MovementPattern};
use crate::utils::retry_on_lock;

/// Save one analysis record
///
/// Writes go through the lock-retry helper to ride out transient
/// "database is locked" contention.
pub async fn insert_result(pool: &SqlitePool, record: &AnalysisRecord) -> Result<()> {
    // Prepare all data BEFORE acquiring a database connection
    let id = record.id.to_string();
    let media_type = record.media_type.as_str();
    let morphology = serde_json::to_string(&record.morphology)
        .map_err(|e| Error::Internal(format!("Failed to serialize morphology: {}", e)))?;
    let movement_pattern = serde_json::to_string(&record.movement_pattern)
        .map_err(|e| Error::Internal(format!("Failed to serialize movement pattern: {}", e)))?;
    let analysis_status = record.analysis_status.as_str();
    let created_at = record.created_at.to_rfc3339();

    let max_wait_ms = settings_max_lock_wait_ms(pool).await?;

    retry_on_lock("insert_result", max_wait_ms, || async {
        sqlx::query(
            r#"
            INSERT INTO analysis_results (
                id, filename, media_type, sperm_count, speed_avg, motility,
                morphology, concentration, total_motile_count,
                processing_time_seconds, movement_pattern, confidence_score,
                analysis_status, media_url, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&record.filename)
        .bind(media_type)
        .bind(record.sperm_count)
        .bind(record.speed_avg)
        .bind(record.motility)
        .bind(&morphology)
        .bind(record.concentration)
        .bind(record.total_motile_count)
        .bind(record.processing_time_seconds)
        .bind(&movement_pattern)
        .bind(record.confidence_score)
        .bind(analysis_status)
        .bind(&record.media_url)
        .bind(&created_at)
        .execute(pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    })
    .await
}

/// Query the most recent records, newest first
pub async fn query_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<AnalysisRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, filename, media_type, sperm_count, speed_avg, motility,
               morphology, concentration, total_motile_count,
               processing_time_seconds, movement_pattern, confidence_score,
               analysis_status, media_url, created_at
        FROM analysis_results
        ORDER BY created_at DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

/// Load a single record by id
pub async fn get_result(pool: &SqlitePool, id: Uuid) -> Result<Option<AnalysisRecord>> {
    let row = sqlx::query(
        r#"
        SELECT id, filename, media_type, sperm_count, speed_avg, motility,
               morphology, concentration, total_motile_count,
               processing_time_seconds, movement_pattern, confidence_score,
               analysis_status, media_url, created_at
        FROM analysis_results
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(record_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Delete a record by id
///
/// Returns false when no row matched.
pub async fn delete_result(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let max_wait_ms = settings_max_lock_wait_ms(pool).await?;
    let id = id.to_string();

    retry_on_lock("delete_result", max_wait_ms, || async {
        let result = sqlx::query("DELETE FROM analysis_results WHERE id = ?")
            .bind(&id)
            .execute(pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    })
    .await
}

/// Decode one analysis_results row
fn record_from_row(row: &SqliteRow) -> Result<AnalysisRecord> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Failed to parse record id: {}", e)))?;

    let media_type: String = row.get("media_type");
    let media_type: crate::models::MediaKind =
        media_type.parse().map_err(Error::Internal)?;

    let morphology: String = row.get("morphology");
    let morphology: MorphologyBreakdown = serde_json::from_str(&morphology)
        .map_err(|e| Error::Internal(format!("Failed to deserialize morphology: {}", e)))?;

    let movement_pattern: String = row.get("movement_pattern");
    let movement_pattern: MovementPattern = serde_json::from_str(&movement_pattern)
        .map_err(|e| Error::Internal(format!("Failed to deserialize movement pattern: {}", e)))?;

    let analysis_status: String = row.get("analysis_status");
    let analysis_status: crate::models::AnalysisStatus =
        analysis_status.parse().map_err(Error::Internal)?;

    let created_at: String = row.get("created_at");
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Internal(format!("Failed to parse created_at: {}", e)))?
        .with_timezone(&chrono::Utc);

    Ok(AnalysisRecord {
        id,
        filename: row.get("filename"),
        media_type,
        sperm_count: row.get("sperm_count"),
        speed_avg: row.get("speed_avg"),
        motility: row.get("motility"),
        morphology,
        concentration: row.get("concentration"),
        total_motile_count: row.get("total_motile_count"),
        processing_time_seconds: row.get("processing_time_seconds"),
        movement_pattern,
        confidence_score: row.get("confidence_score"),
        analysis_status,
        media_url: row.get("media_url"),
        created_at,
    })
}

/// Maximum total lock-retry wait, from settings (default 5000ms)
async fn settings_max_lock_wait_ms(pool: &SqlitePool) -> Result<u64> {
    let value: Option<i64> = sqlx::query_scalar(
        "SELECT CAST(value AS INTEGER) FROM settings WHERE key = 'sa_database_max_lock_wait_ms'",
    )
    .fetch_optional(pool)
    .await?;

    Ok(value.unwrap_or(5000).max(0) as u64)
}
