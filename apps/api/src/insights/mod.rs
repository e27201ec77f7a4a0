// Live Market Insights
// Implements: request lifecycle controller, Gemini-backed provider, report view mapping.
// All LLM calls go through llm_client; no direct Gemini calls here.

pub mod controller;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod provider;
pub mod render;

use thiserror::Error;

use crate::llm_client::LlmError;

/// Shown when a provider failure carries no description of its own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Errors crossing the controller/provider boundary.
///
/// `EmptyTopic` is rejected before any provider call. Everything else is a provider failure
/// and ends up as `RequestState::Failed`.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("A career name is required to analyze the market")]
    EmptyTopic,

    #[error("{0}")]
    Provider(String),

    #[error("The analysis service returned an unexpected response: {0}")]
    MalformedResponse(String),
}

impl From<LlmError> for InsightError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Parse(e) => InsightError::MalformedResponse(e.to_string()),
            LlmError::EmptyContent => InsightError::MalformedResponse(err.to_string()),
            other => InsightError::Provider(other.to_string()),
        }
    }
}

impl InsightError {
    /// Human-readable message for the error panel. Never empty.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

pub use controller::{InsightController, RequestState};
pub use provider::{GeminiInsightProvider, InsightProvider};
