use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::functions_client::FunctionsError;
use crate::insights::InsightError;
use crate::reference::StoreError;
use crate::session::AuthError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Insight error: {0}")]
    Insight(#[from] InsightError),

    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    #[error("Cloud function error: {0}")]
    Function(#[from] FunctionsError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Auth(AuthError::Rejected { message, .. }) => {
                (StatusCode::UNAUTHORIZED, "AUTH_REJECTED", message.clone())
            }
            AppError::Auth(e) => {
                tracing::error!("Auth error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AUTH_ERROR",
                    "The sign-in service is unavailable".to_string(),
                )
            }
            AppError::Insight(InsightError::EmptyTopic) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                InsightError::EmptyTopic.to_string(),
            ),
            AppError::Insight(e) => {
                tracing::error!("Insight error: {e}");
                (StatusCode::BAD_GATEWAY, "INSIGHT_ERROR", e.user_message())
            }
            AppError::Store(e) => {
                tracing::error!("Document store error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "DOCUMENT_STORE_ERROR",
                    "Reference data could not be loaded".to_string(),
                )
            }
            AppError::Function(e) => {
                tracing::error!("Cloud function error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "FUNCTION_ERROR",
                    "The report service failed to respond".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Insight(InsightError::EmptyTopic)
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Insight(InsightError::Provider("down".to_string()))
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Auth(AuthError::Rejected {
                code: "EMAIL_EXISTS".to_string(),
                message: "exists".to_string(),
            })
            .into_response()
            .status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
