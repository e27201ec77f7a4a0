use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::guidance::GuidanceResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PutGuidanceRequest {
    pub recommended_career: String,
}

#[derive(Debug, Serialize)]
pub struct GuidanceResponse {
    pub guidance: Option<GuidanceResult>,
}

/// GET /api/v1/guidance
pub async fn handle_get_guidance(State(state): State<AppState>) -> Json<GuidanceResponse> {
    Json(GuidanceResponse {
        guidance: state.guidance.get().await,
    })
}

/// PUT /api/v1/guidance
///
/// Records the survey outcome. A different career invalidates any previous insight report.
pub async fn handle_put_guidance(
    State(state): State<AppState>,
    Json(req): Json<PutGuidanceRequest>,
) -> Result<Json<GuidanceResponse>, AppError> {
    let result = GuidanceResult::new(&req.recommended_career)?;
    if state.guidance.set(result.clone()).await {
        info!("Recommended career set to '{}'", result.recommended_career);
        state.insights.reset();
    }
    Ok(Json(GuidanceResponse {
        guidance: Some(result),
    }))
}

/// DELETE /api/v1/guidance
pub async fn handle_clear_guidance(State(state): State<AppState>) -> Json<GuidanceResponse> {
    if state.guidance.clear().await {
        info!("Recommended career cleared");
    }
    state.insights.reset();
    Json(GuidanceResponse { guidance: None })
}
