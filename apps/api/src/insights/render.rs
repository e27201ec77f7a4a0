//! Report view mapping — pure functions from controller state to a presentation model.
//!
//! Exactly one view is produced per call. The client draws it; nothing here touches I/O.

use serde::Serialize;

use crate::insights::controller::RequestState;
use crate::insights::models::{Citation, DemandLevel, InsightPayload, SalaryRange};

/// Minimum bar width, in percent, so zero and near-zero salaries stay visible.
pub const MIN_BAR_WIDTH_PERCENT: f64 = 5.0;

const RUPEES_PER_LAKH: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum InsightView {
    /// No recommended career yet: send the user to the survey.
    TakeSurvey {
        title: &'static str,
        message: &'static str,
        action_label: &'static str,
    },
    ReadyToAnalyze {
        career: String,
        action_label: &'static str,
    },
    Analyzing {
        career: String,
        message: String,
        detail: &'static str,
    },
    Error {
        title: &'static str,
        message: String,
        retry_label: &'static str,
    },
    Report(ReportView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub salary_chart: Vec<SalaryBar>,
    pub demand: DemandBadge,
    pub supply_vs_demand: String,
    pub skills: Vec<String>,
    pub hiring_locations: Vec<String>,
    pub growth_outlook: String,
    /// Omitted entirely when the provider cited nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<CitationView>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryBar {
    pub label: &'static str,
    pub value: f64,
    pub display: String,
    pub width_percent: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeStyle {
    pub bg: &'static str,
    pub text: &'static str,
    pub ring: &'static str,
}

pub const NEUTRAL_BADGE: BadgeStyle = BadgeStyle {
    bg: "bg-gray-100",
    text: "text-gray-800",
    ring: "ring-gray-200",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandBadge {
    pub label: String,
    pub style: BadgeStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationView {
    pub title: String,
    pub uri: String,
}

/// Maps the upstream career and the controller state to the view to draw.
/// A missing career always wins: the call-to-action is shown, never an error.
pub fn render_view(career: Option<&str>, state: &RequestState) -> InsightView {
    let Some(career) = career.map(str::trim).filter(|c| !c.is_empty()) else {
        return InsightView::TakeSurvey {
            title: "Get Live Market Insights for Your Career",
            message: "Take the AI survey first. We'll use your recommended career path to \
                generate a custom analysis of current salaries, demand, and required skills.",
            action_label: "Take the AI Survey",
        };
    };

    match state {
        RequestState::Idle => InsightView::ReadyToAnalyze {
            career: career.to_string(),
            action_label: "Analyze Current Market",
        },
        RequestState::Loading { topic } => InsightView::Analyzing {
            career: topic.clone(),
            message: format!("Analyzing the job market for \"{topic}\"..."),
            detail: "Using Google Search to gather the latest salary and demand data.",
        },
        RequestState::Failed { message } => InsightView::Error {
            title: "Analysis Failed",
            message: message.clone(),
            retry_label: "Analyze Current Market",
        },
        RequestState::Success { result } => {
            InsightView::Report(render_report(&result.insight, &result.sources))
        }
    }
}

pub fn render_report(insight: &InsightPayload, sources: &[Citation]) -> ReportView {
    ReportView {
        salary_chart: salary_chart(&insight.average_salary_range),
        demand: demand_badge(&insight.demand_level),
        supply_vs_demand: insight.supply_vs_demand.clone(),
        skills: insight.key_skills_in_demand.clone(),
        hiring_locations: insight.top_hiring_locations.clone(),
        growth_outlook: insight.growth_outlook.clone(),
        citations: citation_list(sources),
    }
}

/// Three bars scaled against `max(high, 1)`.
pub fn salary_chart(range: &SalaryRange) -> Vec<SalaryBar> {
    let max = range.high.max(1.0);
    [
        ("Low End", range.low, "bg-yellow-400"),
        ("Average", range.average, "bg-green-500"),
        ("High End", range.high, "bg-purple-600"),
    ]
    .into_iter()
    .map(|(label, value, color)| SalaryBar {
        label,
        value,
        display: format_lpa(value),
        width_percent: bar_width(value, max),
        color,
    })
    .collect()
}

fn bar_width(value: f64, max: f64) -> f64 {
    (value / max * 100.0).clamp(MIN_BAR_WIDTH_PERCENT, 100.0)
}

/// Formats rupees as lakh per annum, e.g. 900000 → "₹9.0 LPA".
pub fn format_lpa(value: f64) -> String {
    format!("₹{:.1} LPA", value / RUPEES_PER_LAKH)
}

pub fn demand_badge(level: &DemandLevel) -> DemandBadge {
    let style = match level {
        DemandLevel::High => BadgeStyle {
            bg: "bg-green-100",
            text: "text-green-800",
            ring: "ring-green-200",
        },
        DemandLevel::Medium => BadgeStyle {
            bg: "bg-yellow-100",
            text: "text-yellow-800",
            ring: "ring-yellow-200",
        },
        DemandLevel::Low => BadgeStyle {
            bg: "bg-red-100",
            text: "text-red-800",
            ring: "ring-red-200",
        },
        DemandLevel::Other(_) => NEUTRAL_BADGE,
    };
    DemandBadge {
        label: level.label().to_string(),
        style,
    }
}

pub fn citation_list(sources: &[Citation]) -> Option<Vec<CitationView>> {
    if sources.is_empty() {
        return None;
    }
    Some(
        sources
            .iter()
            .map(|s| CitationView {
                title: s.title.clone(),
                uri: s.uri.clone(),
            })
            .collect(),
    )
}
