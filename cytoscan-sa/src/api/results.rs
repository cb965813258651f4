//! Result query, delete, and export API handlers
//!
//! GET /results (JSON or CSV), GET /results/:id, DELETE /results/:id.
//! CSV export is pure consumer-side formatting of stored records.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cytoscan_common::events::CytoEvent;

use crate::{
    db,
    error::{ApiError, ApiResult},
    models::AnalysisRecord,
    AppState,
};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 500;

/// GET /results query parameters
#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    pub limit: Option<i64>,
    pub format: Option<String>,
}

/// GET /results JSON response
#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<AnalysisRecord>,
}

/// DELETE /results/:id response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: Uuid,
}

/// GET /results
///
/// Most recent records first. `format=csv` downloads the same rows as
/// an attachment instead of JSON.
pub async fn list_results(
    State(state): State<AppState>,
    Query(query): Query<ResultsQuery>,
) -> ApiResult<Response> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let records = db::results::query_recent(&state.db, limit).await?;

    match query.format.as_deref() {
        Some("csv") => {
            let csv = records_to_csv(&records);
            let headers = [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"analysis_results.csv\"",
                ),
            ];
            Ok((StatusCode::OK, headers, csv).into_response())
        }
        Some("json") | None => {
            let response = ResultsResponse {
                success: true,
                count: records.len(),
                data: records,
            };
            Ok(Json(response).into_response())
        }
        Some(other) => Err(ApiError::BadRequest(format!(
            "Unknown export format: {}",
            other
        ))),
    }
}

/// GET /results/:id
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AnalysisRecord>> {
    let id = parse_record_id(&id)?;

    match db::results::get_result(&state.db, id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(format!("No analysis result {}", id))),
    }
}

/// DELETE /results/:id
pub async fn delete_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = parse_record_id(&id)?;

    if !db::results::delete_result(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("No analysis result {}", id)));
    }

    state.event_bus.emit(CytoEvent::ResultDeleted {
        result_id: id,
        timestamp: Utc::now(),
    });

    tracing::info!(result_id = %id, "Analysis result deleted");

    Ok(Json(DeleteResponse { success: true, id }))
}

fn parse_record_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid result id: {}", raw)))
}

/// Flatten records into CSV with the canonical persisted field names
fn records_to_csv(records: &[AnalysisRecord]) -> String {
    let mut lines = vec![
        "id,filename,media_type,sperm_count,speed_avg,motility,concentration,\
         total_motile_count,processing_time_seconds,confidence_score,analysis_status,\
         morphology,movement_pattern,media_url,created_at"
            .to_string(),
    ];

    for record in records {
        let morphology = serde_json::to_string(&record.morphology).unwrap_or_default();
        let movement = serde_json::to_string(&record.movement_pattern).unwrap_or_default();

        lines.push(
            [
                record.id.to_string(),
                csv_escape(&record.filename),
                record.media_type.as_str().to_string(),
                record.sperm_count.to_string(),
                record.speed_avg.to_string(),
                record.motility.to_string(),
                record.concentration.to_string(),
                record.total_motile_count.to_string(),
                record.processing_time_seconds.to_string(),
                record.confidence_score.to_string(),
                record.analysis_status.as_str().to_string(),
                csv_escape(&morphology),
                csv_escape(&movement),
                csv_escape(record.media_url.as_deref().unwrap_or("")),
                record.created_at.to_rfc3339(),
            ]
            .join(","),
        );
    }

    lines.join("\n")
}

/// Quote a CSV cell and double any embedded quotes
fn csv_escape(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Build result routes
pub fn results_routes() -> Router<AppState> {
    Router::new()
        .route("/results", get(list_results))
        .route("/results/:id", get(get_result))
        .route("/results/:id", delete(delete_result))
}
