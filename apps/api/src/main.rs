mod config;
mod errors;
mod functions_client;
mod guidance;
mod insights;
mod llm_client;
mod reference;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::functions_client::FunctionsClient;
use crate::guidance::GuidanceStore;
use crate::insights::{GeminiInsightProvider, InsightController};
use crate::llm_client::LlmClient;
use crate::reference::FirestoreClient;
use crate::routes::{build_router, cors_layer};
use crate::session::{AuthClient, Session};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Peekafuture API v{}", env!("CARGO_PKG_VERSION"));

    // Identity provider + session mirror (unsubscribed on shutdown)
    let auth = AuthClient::new(config.firebase_api_key.clone());
    let (session, subscription) = Session::init(&auth);

    // Document store
    let documents = FirestoreClient::new(
        config.firebase_project_id.clone(),
        config.firebase_api_key.clone(),
    )
    .with_auth(auth.clone());
    info!(
        "Document store initialized (project: {})",
        config.firebase_project_id
    );

    // Callable functions
    let functions = FunctionsClient::new(
        &config.firebase_functions_region,
        &config.firebase_project_id,
        auth.clone(),
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let insights = InsightController::new(Arc::new(GeminiInsightProvider(llm)));

    // Build app state
    let state = AppState {
        auth,
        session,
        documents: Arc::new(documents),
        functions,
        guidance: Arc::new(GuidanceStore::default()),
        insights: Arc::new(insights),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config.cors_allowed_origin.as_deref())?);

    let addr = SocketAddr::new(config.bind_address, config.port);
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    subscription.unsubscribe();
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
