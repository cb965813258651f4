//! Parameter management API handlers
//!
//! GET /parameters, PUT /parameters

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db,
    error::{ApiError, ApiResult},
    models::AnalysisParameters,
    AppState,
};

/// PUT /parameters request (partial updates)
#[derive(Debug, Deserialize)]
pub struct UpdateParametersRequest {
    pub sample_cap: Option<usize>,
    pub edge_threshold: Option<f64>,
    pub variance_threshold: Option<f64>,
    pub std_dev_threshold: Option<f64>,
    pub edge_count_threshold: Option<usize>,
    pub min_cell_count: Option<i64>,
    pub max_cell_count: Option<i64>,
    pub high_motion_tier: Option<f64>,
    pub mid_motion_tier: Option<f64>,
    pub jump_threshold: Option<f64>,
    pub sharpness_weight: Option<f64>,
    pub size_weight: Option<f64>,
    pub quality_floor: Option<f64>,
    pub quality_ceiling: Option<f64>,
    pub jitter_seed: Option<Option<u64>>,
}

/// PUT /parameters response
#[derive(Debug, Serialize)]
pub struct UpdateParametersResponse {
    pub status: String,
    pub parameters: AnalysisParameters,
}

/// GET /parameters
///
/// Current analysis parameters (persisted values or defaults).
pub async fn get_parameters(
    State(state): State<AppState>,
) -> ApiResult<Json<AnalysisParameters>> {
    let parameters = db::settings::load_analysis_parameters(&state.db).await?;
    tracing::debug!(?parameters, "Get analysis parameters");
    Ok(Json(parameters))
}

/// PUT /parameters
///
/// Partial update; the merged parameter set is validated before it is
/// persisted, so a bad update never poisons later analyses.
pub async fn update_parameters(
    State(state): State<AppState>,
    Json(request): Json<UpdateParametersRequest>,
) -> ApiResult<Json<UpdateParametersResponse>> {
    tracing::info!(?request, "Update analysis parameters");

    let mut parameters = db::settings::load_analysis_parameters(&state.db).await?;

    if let Some(val) = request.sample_cap {
        parameters.sample_cap = val;
    }
    if let Some(val) = request.edge_threshold {
        parameters.edge_threshold = val;
    }
    if let Some(val) = request.variance_threshold {
        parameters.variance_threshold = val;
    }
    if let Some(val) = request.std_dev_threshold {
        parameters.std_dev_threshold = val;
    }
    if let Some(val) = request.edge_count_threshold {
        parameters.edge_count_threshold = val;
    }
    if let Some(val) = request.min_cell_count {
        parameters.min_cell_count = val;
    }
    if let Some(val) = request.max_cell_count {
        parameters.max_cell_count = val;
    }
    if let Some(val) = request.high_motion_tier {
        parameters.high_motion_tier = val;
    }
    if let Some(val) = request.mid_motion_tier {
        parameters.mid_motion_tier = val;
    }
    if let Some(val) = request.jump_threshold {
        parameters.jump_threshold = val;
    }
    if let Some(val) = request.sharpness_weight {
        parameters.sharpness_weight = val;
    }
    if let Some(val) = request.size_weight {
        parameters.size_weight = val;
    }
    if let Some(val) = request.quality_floor {
        parameters.quality_floor = val;
    }
    if let Some(val) = request.quality_ceiling {
        parameters.quality_ceiling = val;
    }
    if let Some(val) = request.jitter_seed {
        parameters.jitter_seed = val;
    }

    parameters.validate().map_err(ApiError::BadRequest)?;

    db::settings::save_analysis_parameters(&state.db, &parameters).await?;

    Ok(Json(UpdateParametersResponse {
        status: "updated".to_string(),
        parameters,
    }))
}

/// Build parameter management routes
pub fn parameter_routes() -> Router<AppState> {
    Router::new()
        .route("/parameters", get(get_parameters))
        .route("/parameters", put(update_parameters))
}
