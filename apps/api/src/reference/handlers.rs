use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::reference::{
    get_careers, get_records, CareerStream, ReferenceRecord, COLLEGES_COLLECTION,
    STREAMS_COLLECTION, VENTURES_COLLECTION,
};
use crate::state::AppState;

/// GET /api/v1/reference/careers
pub async fn handle_get_careers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CareerStream>>, AppError> {
    Ok(Json(get_careers(state.documents.as_ref()).await?))
}

/// GET /api/v1/reference/colleges
pub async fn handle_get_colleges(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReferenceRecord>>, AppError> {
    Ok(Json(
        get_records(state.documents.as_ref(), COLLEGES_COLLECTION).await?,
    ))
}

/// GET /api/v1/reference/streams
pub async fn handle_get_streams(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReferenceRecord>>, AppError> {
    Ok(Json(
        get_records(state.documents.as_ref(), STREAMS_COLLECTION).await?,
    ))
}

/// GET /api/v1/reference/ventures
pub async fn handle_get_ventures(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReferenceRecord>>, AppError> {
    Ok(Json(
        get_records(state.documents.as_ref(), VENTURES_COLLECTION).await?,
    ))
}
