//! Axum route handlers for the Market Insights API.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::insights::controller::Snapshot;
use crate::insights::render::{render_view, InsightView};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StartInsightRequest {
    /// Overrides the recommended career from the survey.
    #[serde(default)]
    pub career_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartOptions {
    /// Block until the analysis settles instead of returning the `Loading` snapshot.
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub career: Option<String>,
    pub snapshot: Snapshot,
    pub view: InsightView,
}

/// The view's career is the survey recommendation, or else the topic last analyzed.
async fn current_response(state: &AppState) -> InsightResponse {
    let snapshot = state.insights.snapshot();
    let career = state
        .guidance
        .recommended_career()
        .await
        .or_else(|| snapshot.topic.clone());
    let view = render_view(career.as_deref(), &snapshot.state);
    InsightResponse {
        career,
        snapshot,
        view,
    }
}

/// GET /api/v1/insights
///
/// Current controller state and the view the client should draw for it.
pub async fn handle_get_insights(State(state): State<AppState>) -> Json<InsightResponse> {
    Json(current_response(&state).await)
}

/// POST /api/v1/insights[?wait=true]
///
/// Starts a market analysis. By default returns immediately with the `Loading` snapshot
/// (202); poll GET /api/v1/insights for the outcome. With `wait=true` responds once the
/// analysis has settled (200).
pub async fn handle_start_insights(
    State(state): State<AppState>,
    Query(options): Query<StartOptions>,
    body: Bytes,
) -> Result<(StatusCode, Json<InsightResponse>), AppError> {
    let request = parse_start_request(&body)?;

    let topic = match request.career_name {
        Some(name) => name,
        None => state
            .guidance
            .recommended_career()
            .await
            .unwrap_or_default(),
    };

    let pending = state.insights.start(&topic)?;
    info!("Market analysis started (generation {})", pending.generation);

    if !options.wait {
        return Ok((StatusCode::ACCEPTED, Json(current_response(&state).await)));
    }

    if !pending.settled().await {
        info!("Analysis was superseded before it settled");
    }
    Ok((StatusCode::OK, Json(current_response(&state).await)))
}

/// An empty body means "use the recorded guidance". Anything else must be a valid request.
fn parse_start_request(body: &[u8]) -> Result<StartInsightRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StartInsightRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid insight request: {e}")))
}
