use std::net::IpAddr;

use anyhow::{Context, Result};

const DEFAULT_FUNCTIONS_REGION: &str = "us-central1";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub firebase_api_key: String,
    pub firebase_project_id: String,
    pub firebase_functions_region: String,
    /// The server holds one signed-in session; keep it on loopback unless fronted by a proxy.
    pub bind_address: IpAddr,
    pub port: u16,
    /// Only this origin may call the API from a browser. No cross-origin access when unset.
    pub cors_allowed_origin: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            firebase_api_key: require_env("FIREBASE_API_KEY")?,
            firebase_project_id: require_env("FIREBASE_PROJECT_ID")?,
            firebase_functions_region: std::env::var("FIREBASE_FUNCTIONS_REGION")
                .unwrap_or_else(|_| DEFAULT_FUNCTIONS_REGION.to_string()),
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string())
                .parse::<IpAddr>()
                .context("BIND_ADDRESS must be a valid IP address")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            cors_allowed_origin: std::env::var("CORS_ALLOWED_ORIGIN")
                .ok()
                .filter(|origin| !origin.trim().is_empty()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
