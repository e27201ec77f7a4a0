pub mod health;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use crate::functions_client::handlers as roadmap;
use crate::guidance::handlers as guidance;
use crate::insights::handlers as insights;
use crate::reference::handlers as reference;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session & auth
        .route("/api/v1/session", get(session::handle_get_session))
        .route("/api/v1/auth/sign-up", post(session::handle_sign_up))
        .route("/api/v1/auth/sign-in", post(session::handle_sign_in))
        .route("/api/v1/auth/sign-out", post(session::handle_sign_out))
        // Survey outcome
        .route(
            "/api/v1/guidance",
            get(guidance::handle_get_guidance)
                .put(guidance::handle_put_guidance)
                .delete(guidance::handle_clear_guidance),
        )
        // Live market insights
        .route(
            "/api/v1/insights",
            get(insights::handle_get_insights).post(insights::handle_start_insights),
        )
        // Reference data
        .route(
            "/api/v1/reference/careers",
            get(reference::handle_get_careers),
        )
        .route(
            "/api/v1/reference/colleges",
            get(reference::handle_get_colleges),
        )
        .route(
            "/api/v1/reference/streams",
            get(reference::handle_get_streams),
        )
        .route(
            "/api/v1/reference/ventures",
            get(reference::handle_get_ventures),
        )
        // Roadmap report
        .route("/api/v1/roadmap/pdf", post(roadmap::handle_roadmap_pdf))
        .with_state(state)
}

/// CORS for the browser client. Without a configured origin no cross-origin request is allowed.
pub fn cors_layer(allowed_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let Some(origin) = allowed_origin else {
        info!("CORS_ALLOWED_ORIGIN not set; cross-origin requests are refused");
        return Ok(CorsLayer::new());
    };

    let origin = HeaderValue::from_str(origin.trim())
        .with_context(|| format!("CORS_ALLOWED_ORIGIN '{origin}' is not a valid origin"))?;
    info!("CORS allowed origin: {origin:?}");

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}
