//! Market-insight data model and the validation boundary for provider payloads.
//!
//! The provider returns loosely-shaped JSON. `RawInsightPayload` accepts whatever arrives;
//! `RawInsightPayload::validate` turns it into a strict `InsightPayload` or rejects it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::insights::InsightError;
use crate::llm_client::WebSource;

/// One on-demand analysis request. Constructing it is the only way to reach the provider,
/// so a blank topic never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub career_name: String,
}

impl AnalysisRequest {
    pub fn new(topic: &str) -> Result<Self, InsightError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(InsightError::EmptyTopic);
        }
        Ok(Self {
            career_name: topic.to_string(),
        })
    }
}

/// Entry-level salary band, in rupees per annum. Invariant: `0 <= low <= average <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub low: f64,
    pub average: f64,
    pub high: f64,
}

/// Market demand for a career. Values outside the known three are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DemandLevel {
    High,
    Medium,
    Low,
    Other(String),
}

impl DemandLevel {
    pub fn label(&self) -> &str {
        match self {
            DemandLevel::High => "High",
            DemandLevel::Medium => "Medium",
            DemandLevel::Low => "Low",
            DemandLevel::Other(s) => s,
        }
    }
}

impl From<String> for DemandLevel {
    fn from(value: String) -> Self {
        match value.trim() {
            "High" => DemandLevel::High,
            "Medium" => DemandLevel::Medium,
            "Low" => DemandLevel::Low,
            _ => DemandLevel::Other(value),
        }
    }
}

impl From<DemandLevel> for String {
    fn from(level: DemandLevel) -> Self {
        level.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightPayload {
    pub average_salary_range: SalaryRange,
    pub demand_level: DemandLevel,
    pub supply_vs_demand: String,
    /// Presentation order; duplicates removed.
    pub key_skills_in_demand: Vec<String>,
    pub top_hiring_locations: Vec<String>,
    pub growth_outlook: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub uri: String,
    pub title: String,
}

impl From<WebSource> for Citation {
    fn from(source: WebSource) -> Self {
        Citation {
            uri: source.uri.unwrap_or_default(),
            title: source.title.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub insight: InsightPayload,
    pub sources: Vec<Citation>,
}

// ────────────────────────────────────────────────────────────────────────────
// Provider boundary
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSalaryRange {
    pub low: Option<f64>,
    pub average: Option<f64>,
    pub high: Option<f64>,
}

/// The insight JSON exactly as the model produced it. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawInsightPayload {
    pub average_salary_range: Option<RawSalaryRange>,
    pub demand_level: Option<String>,
    pub supply_vs_demand: Option<String>,
    pub key_skills_in_demand: Option<Vec<String>>,
    pub top_hiring_locations: Option<Vec<String>>,
    pub growth_outlook: Option<String>,
}

impl RawInsightPayload {
    /// Validates the salary band and defaults every descriptive field.
    ///
    /// Rejects: a missing band, missing/negative/non-finite figures.
    /// Repairs: figures out of order are sorted; a missing demand level becomes "Unknown".
    pub fn validate(self) -> Result<InsightPayload, InsightError> {
        let raw = self.average_salary_range.ok_or_else(|| {
            InsightError::MalformedResponse("averageSalaryRange is missing".to_string())
        })?;

        let low = salary_figure("low", raw.low)?;
        let average = salary_figure("average", raw.average)?;
        let high = salary_figure("high", raw.high)?;

        let mut figures = [low, average, high];
        if !(low <= average && average <= high) {
            warn!(low, average, high, "Salary figures out of order; sorting");
            figures.sort_by(f64::total_cmp);
        }

        Ok(InsightPayload {
            average_salary_range: SalaryRange {
                low: figures[0],
                average: figures[1],
                high: figures[2],
            },
            demand_level: self
                .demand_level
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string())
                .into(),
            supply_vs_demand: self.supply_vs_demand.unwrap_or_default(),
            key_skills_in_demand: clean_tags(self.key_skills_in_demand),
            top_hiring_locations: clean_tags(self.top_hiring_locations),
            growth_outlook: self.growth_outlook.unwrap_or_default(),
        })
    }
}

fn salary_figure(name: &str, value: Option<f64>) -> Result<f64, InsightError> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(InsightError::MalformedResponse(format!(
            "averageSalaryRange.{name} must be a non-negative number, got {v}"
        ))),
        None => Err(InsightError::MalformedResponse(format!(
            "averageSalaryRange.{name} is missing"
        ))),
    }
}

/// Trims, drops blanks, and removes duplicates while keeping first-seen order.
fn clean_tags(tags: Option<Vec<String>>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags.unwrap_or_default() {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
