//! Settings database operations
//!
//! Key-value accessors over the settings table, plus load/save for the
//! analysis parameter set.

use sqlx::SqlitePool;

use cytoscan_common::{Error, Result};

use crate::models::AnalysisParameters;

const ANALYSIS_PARAMETERS_KEY: &str = "analysis_parameters";

/// Load analysis parameters from the settings table
///
/// Returns defaults when nothing has been persisted yet. Unknown or
/// missing fields in a stored blob fall back to their defaults via
/// serde, so parameter additions stay backward compatible.
pub async fn load_analysis_parameters(pool: &SqlitePool) -> Result<AnalysisParameters> {
    match get_setting(pool, ANALYSIS_PARAMETERS_KEY).await? {
        Some(json) => serde_json::from_str(&json).map_err(|e| {
            Error::Internal(format!("Failed to deserialize analysis parameters: {}", e))
        }),
        None => Ok(AnalysisParameters::default()),
    }
}

/// Persist analysis parameters to the settings table
pub async fn save_analysis_parameters(
    pool: &SqlitePool,
    params: &AnalysisParameters,
) -> Result<()> {
    let json = serde_json::to_string(params)
        .map_err(|e| Error::Internal(format!("Failed to serialize analysis parameters: {}", e)))?;

    set_setting(pool, ANALYSIS_PARAMETERS_KEY, &json).await?;
    tracing::info!("Analysis parameters saved to database");
    Ok(())
}

/// Generic setting getter
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value)
}

/// Generic setting setter (upsert)
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}
