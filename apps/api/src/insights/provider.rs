//! Insight providers — pluggable, trait-based source of market analyses.
//!
//! Default: `GeminiInsightProvider` (Gemini with Google Search grounding).
//! `AppState` holds the controller, which carries an `Arc<dyn InsightProvider>`.

use async_trait::async_trait;
use tracing::info;

use crate::insights::models::{AnalysisRequest, AnalysisResult, Citation, RawInsightPayload};
use crate::insights::prompts::{MARKET_INSIGHT_PROMPT, MARKET_INSIGHT_SYSTEM};
use crate::insights::InsightError;
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::{GroundedJson, LlmClient};

/// The analysis provider trait. Implement this to swap backends without touching
/// the controller or handlers.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, InsightError>;
}

/// Market analysis through Gemini. Citations come from the grounding metadata,
/// not from the model's JSON.
pub struct GeminiInsightProvider(pub LlmClient);

#[async_trait]
impl InsightProvider for GeminiInsightProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, InsightError> {
        let prompt = build_insight_prompt(request);

        let GroundedJson { value, sources } = self
            .0
            .call_json::<RawInsightPayload>(&prompt, MARKET_INSIGHT_SYSTEM)
            .await?;

        let insight = value.validate()?;
        let sources: Vec<Citation> = sources.into_iter().map(Citation::from).collect();

        info!(
            "Market insight ready for '{}': demand={}, {} sources",
            request.career_name,
            insight.demand_level.label(),
            sources.len()
        );

        Ok(AnalysisResult { insight, sources })
    }
}

fn build_insight_prompt(request: &AnalysisRequest) -> String {
    MARKET_INSIGHT_PROMPT
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{career_name}", &request.career_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_career_and_grounding() {
        let request = AnalysisRequest::new("Data Scientist").unwrap();
        let prompt = build_insight_prompt(&request);
        assert!(prompt.contains("\"Data Scientist\""));
        assert!(prompt.contains(GROUNDING_INSTRUCTION));
        assert!(!prompt.contains("{career_name}"));
        assert!(!prompt.contains("{grounding_instruction}"));
    }
}
