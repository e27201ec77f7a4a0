use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::session::{Identity, SessionState};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub identity: Identity,
}

#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub signed_out: bool,
}

fn require_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("email cannot be empty".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("password cannot be empty".to_string()));
    }
    Ok(())
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionState> {
    Json(state.session.current())
}

/// POST /api/v1/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<IdentityResponse>, AppError> {
    require_credentials(&req.email, &req.password)?;
    let identity = state.auth.sign_in(req.email.trim(), &req.password).await?;
    Ok(Json(IdentityResponse { identity }))
}

/// POST /api/v1/auth/sign-up
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<Json<IdentityResponse>, AppError> {
    require_credentials(&req.email, &req.password)?;
    let identity = state
        .auth
        .sign_up(req.email.trim(), &req.password, &req.display_name)
        .await?;
    Ok(Json(IdentityResponse { identity }))
}

/// POST /api/v1/auth/sign-out
pub async fn handle_sign_out(State(state): State<AppState>) -> Json<SignOutResponse> {
    let signed_out = state.auth.sign_out().await;
    Json(SignOutResponse { signed_out })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_credentials() {
        assert!(require_credentials("a@b.co", "secret").is_ok());
        assert!(matches!(
            require_credentials(" ", "secret"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            require_credentials("a@b.co", ""),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_sign_up_display_name_defaults_empty() {
        let req: SignUpRequest =
            serde_json::from_value(serde_json::json!({ "email": "a@b.co", "password": "x" }))
                .unwrap();
        assert!(req.display_name.is_empty());
    }
}
