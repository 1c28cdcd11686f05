use serde_json::Value;
use thiserror::Error;

use super::{render_value, ProjectData};

/// Portfolio summaries are cut to this many characters before embedding.
pub const SUMMARY_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("projectData is required for this analysis type")]
    MissingProjectData,

    #[error("projects must be an array")]
    ProjectsNotArray,
}

pub fn cost_forecast(project: &ProjectData<'_>) -> Result<String, PromptError> {
    Ok(format!(
        r#"You are an AI project manager. Analyze the following project data and provide a JSON response.

Project Context:
Name: {name}
Budget: {budget}
Start Date: {start}
Description: {description}

Task: Generate a cost forecast comparing actual spend vs AI-predicted budget for the last 6 months.
Also predict final cost and potential overrun percentage.

Return ONLY valid JSON in this format:
{{
    "forecastData": [
        {{"name": "Month 1", "Actual": 1000, "Predicted": 1200}},
        ... (6 months)
    ],
    "finalCost": 120000,
    "overrunPercentage": 15,
    "insight": "Brief one sentence insight."
}}"#,
        name = project.render("name"),
        budget = project.render("budget"),
        start = project.render("startDate"),
        description = project.render("description"),
    ))
}

pub fn resource_utilization(project: &ProjectData<'_>) -> Result<String, PromptError> {
    Ok(format!(
        r#"You are an AI resource planner. Analyze the project: {name}.
Generate a heatmap of team activity and utilization stats.

Return ONLY valid JSON in this format:
{{
    "utilizationScore": 85,
    "heatmap": [
        {{"name": "Dev Team", "data": [{{"x": "Mon", "y": 80}}, {{"x": "Tue", "y": 90}} ... (5 days)]}}
    ],
    "pendingApprovals": 3,
    "insight": "Brief one sentence insight."
}}"#,
        name = project.render("name"),
    ))
}

pub fn risk_assessment(project: &ProjectData<'_>) -> Result<String, PromptError> {
    Ok(format!(
        r#"You are an AI Risk Analyst. Analyze: {name}.

Return ONLY valid JSON in this format:
{{
    "riskScore": 78,
    "confidenceLevel": "High",
    "hotspots": [
        "Supply Chain Delay"
    ],
    "insight": "Brief one sentence mitigation strategy."
}}"#,
        name = project.render("name"),
    ))
}

pub fn timeline_prediction(project: &ProjectData<'_>) -> Result<String, PromptError> {
    Ok(format!(
        r#"You are an AI Scheduler. Analyze: {name}.

Return ONLY valid JSON in this format:
{{
    "predictedCompletion": "2025-12-25",
    "delayProbability": "Medium",
    "phases": [
        {{"name": "Implementation", "status": "Delayed"}}
    ],
    "insight": "Reason for potential delay."
}}"#,
        name = project.render("name"),
    ))
}

pub fn dashboard_cost_forecast(projects: &[Value]) -> Result<String, PromptError> {
    let summary = portfolio_summary(projects);
    let total = format_number(total_budget(projects));

    Ok(format!(
        r#"You are a Portfolio Manager. Analyze these projects: {summary}...
Total Portfolio Budget: ${total}.

Generate an aggregated 'Actual vs Predicted' cost analysis for the last 6 months for the entire portfolio.
Assume 'Actual' varies slightly from 'Predicted'.

Return ONLY valid JSON in this format:
{{
    "forecastData": [
        {{"name": "Month 1", "Actual": 45000, "Predicted": 50000}},
        {{"name": "Month 2", "Actual": 52000, "Predicted": 50000}},
        ... (6 months)
    ],
    "insight": "Brief aggregated financial insight."
}}"#
    ))
}

/// `name ($budget)` per project, joined and capped at [`SUMMARY_LIMIT`]
/// UTF-16 code units, the length a browser client sees. A surrogate pair cut
/// in half at the cap becomes U+FFFD.
pub fn portfolio_summary(projects: &[Value]) -> String {
    let summary = projects
        .iter()
        .map(|p| {
            format!(
                "{} (${})",
                render_value(p.get("name")),
                render_value(p.get("budget"))
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let units: Vec<u16> = summary.encode_utf16().take(SUMMARY_LIMIT).collect();
    String::from_utf16_lossy(&units)
}

/// Sum of budgets. Numeric strings count; anything else counts as zero.
pub fn total_budget(projects: &[Value]) -> f64 {
    projects
        .iter()
        .map(|p| numeric(p.get("budget")))
        .filter(|b| b.is_finite())
        .sum()
}

fn numeric(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse().unwrap_or(0.0)
            }
        }
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    }
}

/// Whole numbers print without a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::analysis::{AnalysisKind, AnalysisRequest};

    fn request(kind: &str) -> AnalysisRequest {
        serde_json::from_value(json!({
            "type": kind,
            "projectData": {
                "name": "Alpha",
                "budget": 25000,
                "startDate": "2025-01-10",
                "description": "Warehouse retrofit",
            },
            "projects": [{ "name": "Alpha", "budget": 25000 }],
        }))
        .unwrap()
    }

    #[test]
    fn every_kind_builds_a_prompt() {
        for kind in AnalysisKind::ALL {
            let prompt = kind.prompt(&request(kind.as_str())).unwrap();
            assert!(!prompt.is_empty(), "{kind:?}");
            assert!(prompt.contains("Return ONLY valid JSON"), "{kind:?}");
        }
    }

    #[test]
    fn cost_forecast_embeds_project_fields() {
        let prompt = AnalysisKind::CostForecast
            .prompt(&request("cost_forecast"))
            .unwrap();

        assert!(prompt.contains("Name: Alpha"));
        assert!(prompt.contains("Budget: 25000"));
        assert!(prompt.contains("Start Date: 2025-01-10"));
        assert!(prompt.contains("Description: Warehouse retrofit"));
        assert!(prompt.contains(r#""overrunPercentage": 15"#));
    }

    #[test]
    fn missing_fields_do_not_fail() {
        let data = json!({ "name": "Gamma" });
        let prompt = cost_forecast(&ProjectData(Some(&data))).unwrap();
        assert!(prompt.contains("Budget: undefined"));
    }

    #[test]
    fn portfolio_prompt_sums_budgets() {
        let projects = vec![
            json!({ "name": "A", "budget": 1000 }),
            json!({ "name": "B", "budget": "2500" }),
            json!({ "name": "C", "budget": "lots" }),
            json!({ "name": "D" }),
        ];

        assert_eq!(total_budget(&projects), 3500.0);
        let prompt = dashboard_cost_forecast(&projects).unwrap();
        assert!(prompt.contains("A ($1000), B ($2500), C ($lots), D ($undefined)..."));
        assert!(prompt.contains("Total Portfolio Budget: $3500."));
    }

    #[test]
    fn portfolio_summary_is_capped() {
        let projects: Vec<Value> = (0..200)
            .map(|i| json!({ "name": format!("Project {i}"), "budget": 100000 }))
            .collect();

        assert_eq!(
            portfolio_summary(&projects).encode_utf16().count(),
            SUMMARY_LIMIT
        );
        assert_eq!(portfolio_summary(&[]), "");
    }

    #[test]
    fn portfolio_summary_cap_counts_utf16_units() {
        // each rocket is two UTF-16 units but one char
        let projects: Vec<Value> = (0..100)
            .map(|_| json!({ "name": "🚀🚀🚀🚀", "budget": 1 }))
            .collect();

        let summary = portfolio_summary(&projects);

        assert_eq!(summary.encode_utf16().count(), SUMMARY_LIMIT);
        assert!(summary.chars().count() < SUMMARY_LIMIT);
        assert!(summary.starts_with("🚀🚀🚀🚀 ($1), "));

        // a pair split by the cap is replaced, not dropped
        let odd = [json!({ "name": format!("{}🚀", "a".repeat(SUMMARY_LIMIT - 1)) })];
        let summary = portfolio_summary(&odd);
        assert_eq!(summary.encode_utf16().count(), SUMMARY_LIMIT);
        assert!(summary.ends_with('\u{FFFD}'));
    }

    #[test]
    fn projects_must_be_an_array() {
        let request: AnalysisRequest = serde_json::from_value(json!({
            "type": "dashboard_cost_forecast",
            "projects": { "name": "oops" },
        }))
        .unwrap();

        assert!(matches!(
            AnalysisKind::DashboardCostForecast.prompt(&request),
            Err(PromptError::ProjectsNotArray)
        ));
    }

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(3500.0), "3500");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(0.0), "0");
    }
}
