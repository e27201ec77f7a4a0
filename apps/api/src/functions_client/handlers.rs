use axum::{extract::State, Json};
use serde_json::Value;

use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/roadmap/pdf
///
/// Forwards the roadmap payload to the PDF report function and returns its result verbatim.
pub async fn handle_roadmap_pdf(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    if state.session.identity().is_none() {
        return Err(AppError::Unauthorized);
    }
    Ok(Json(state.functions.roadmap_pdf(payload).await?))
}
