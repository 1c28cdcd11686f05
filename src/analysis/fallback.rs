//! Stand-in analytics for when the model cannot be reached.
//!
//! Values are derived from a seed built from the project name, so the same
//! project keeps getting the same numbers across failures. Every kind reads
//! its own offsets of the sequence:
//!
//! | kind | offsets |
//! |---|---|
//! | cost_forecast | 1..=3 |
//! | resource_utilization | 4..=20 |
//! | risk_assessment | 25 |
//! | timeline_prediction | 30 |
//!
//! `dashboard_cost_forecast` is not seeded: it draws from the thread RNG
//! around a fixed 50000 base.

use serde_json::Value;

use super::{
    schema::{
        AnalysisResult, CostForecast, ForecastPoint, HeatPoint, HeatmapRow, Level, Phase,
        PortfolioForecast, ResourceUtilization, RiskAssessment, TimelinePrediction,
    },
    AnalysisKind, ProjectData,
};

pub const DEFAULT_NAME: &str = "Default";
pub const DEFAULT_BUDGET: f64 = 10_000.0;
pub const PORTFOLIO_BASE: f64 = 50_000.0;
pub const DEFAULT_COMPLETION: &str = "2025-12-31";

const ACTUAL_SCHEDULE: [f64; 6] = [0.1, 0.25, 0.4, 0.55, 0.7, 0.85];
const PREDICTED_SCHEDULE: [f64; 6] = [0.12, 0.24, 0.36, 0.48, 0.60, 0.72];
const WEEKDAYS: [&str; 5] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

/// Fallback for a raw `type` string. Unknown kinds get a "no data" object.
pub fn generate(kind: &str, project: &ProjectData<'_>) -> AnalysisResult {
    match AnalysisKind::parse(kind) {
        Some(kind) => kind.fallback(project),
        None => AnalysisResult::no_data(),
    }
}

/// Deterministic `[0, 1)` sequence keyed by a project name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Seeded {
    seed: f64,
}

impl Seeded {
    /// Seed is the sum of the name's UTF-16 code units.
    pub fn from_name(name: &str) -> Self {
        let seed: u64 = name.encode_utf16().map(u64::from).sum();
        Self { seed: seed as f64 }
    }

    /// Seed for a project's `name`. Missing or falsy names use
    /// [`DEFAULT_NAME`]; any other non-string name has no characters to sum
    /// and seeds at zero.
    pub fn for_project(project: &ProjectData<'_>) -> Self {
        match project.field("name") {
            Some(Value::String(name)) if !name.is_empty() => Self::from_name(name),
            None | Some(Value::Null | Value::Bool(false) | Value::String(_)) => {
                Self::from_name(DEFAULT_NAME)
            }
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Self::from_name(DEFAULT_NAME),
            Some(_) => Self { seed: 0.0 },
        }
    }

    pub fn at(&self, offset: u32) -> f64 {
        let x = (self.seed + f64::from(offset)).sin() * 10_000.0;
        x - x.floor()
    }

    fn scaled(&self, offset: u32, base: f64, span: f64) -> u32 {
        (base + self.at(offset) * span).floor() as u32
    }
}

/// `budget` with leading-number semantics; zero or unreadable means
/// [`DEFAULT_BUDGET`].
pub fn budget(project: &ProjectData<'_>) -> f64 {
    let parsed = match project.field("budget") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => leading_number(s),
        _ => None,
    };

    match parsed {
        Some(b) if b.is_finite() && b != 0.0 => b,
        _ => DEFAULT_BUDGET,
    }
}

/// Longest numeric prefix of `s`, ignoring leading whitespace.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let whole = digits_from(end);
    end += whole;

    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        if whole + fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole + fraction == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    s[..end].parse().ok()
}

fn month(index: usize) -> String {
    format!("Month {}", index + 1)
}

pub fn cost_forecast(project: &ProjectData<'_>) -> CostForecast {
    let random = Seeded::for_project(project);
    let budget = budget(project);
    let variance = 1.0 + (random.at(1) * 0.4 - 0.2);

    let forecast_data = ACTUAL_SCHEDULE
        .iter()
        .zip(PREDICTED_SCHEDULE)
        .enumerate()
        .map(|(i, (actual, predicted))| ForecastPoint {
            name: month(i),
            actual: budget * actual,
            predicted: budget * predicted * variance,
        })
        .collect();

    CostForecast {
        forecast_data,
        final_cost: budget * (1.05 + random.at(2) * 0.1),
        overrun_percentage: random.scaled(3, 5.0, 15.0),
        insight: "Spending is slightly above projection but within acceptable variance (Backend Fallback)."
            .to_string(),
    }
}

pub fn resource_utilization(project: &ProjectData<'_>) -> ResourceUtilization {
    let random = Seeded::for_project(project);

    // (team, first offset, floor, span)
    let teams = [
        ("Dev Team", 5, 60.0, 40.0),
        ("QA Team", 10, 50.0, 40.0),
        ("Design", 15, 40.0, 50.0),
    ];
    let heatmap = teams
        .into_iter()
        .map(|(name, offset, base, span)| HeatmapRow {
            name: name.to_string(),
            data: WEEKDAYS
                .iter()
                .zip(offset..)
                .map(|(day, offset)| HeatPoint {
                    x: day.to_string(),
                    y: random.scaled(offset, base, span),
                })
                .collect(),
        })
        .collect();

    ResourceUtilization {
        utilization_score: random.scaled(4, 70.0, 25.0),
        heatmap,
        pending_approvals: random.scaled(20, 0.0, 5.0),
        insight: "Resource utilization is optimal across key teams (Backend Fallback)."
            .to_string(),
    }
}

pub fn risk_assessment(project: &ProjectData<'_>) -> RiskAssessment {
    let score = Seeded::for_project(project).scaled(25, 0.0, 100.0);
    let elevated = score > 50;

    let hotspots = if elevated {
        vec!["Budget Constraint".to_string(), "Tight Deadline".to_string()]
    } else {
        vec!["Minor Schedule Slip".to_string()]
    };
    let insight = if elevated {
        "High risk detected (Backend Fallback)."
    } else {
        "Project risk is well managed (Backend Fallback)."
    };

    RiskAssessment {
        risk_score: score,
        confidence_level: Level::from_thresholds(f64::from(score), 75.0, 40.0),
        hotspots,
        insight: insight.to_string(),
    }
}

pub fn timeline_prediction(project: &ProjectData<'_>) -> TimelinePrediction {
    let delay_chance = Seeded::for_project(project).at(30);
    let predicted_completion = project
        .field("dueDate")
        .and_then(Value::as_str)
        .filter(|due| !due.is_empty())
        .unwrap_or(DEFAULT_COMPLETION);

    let execution = if delay_chance > 0.5 {
        "Delayed"
    } else {
        "On Track"
    };
    let phases = [("Planning", "Done"), ("Execution", execution), ("Testing", "Pending")]
        .into_iter()
        .map(|(name, status)| Phase {
            name: name.to_string(),
            status: status.to_string(),
        })
        .collect();

    TimelinePrediction {
        predicted_completion: predicted_completion.to_string(),
        delay_probability: Level::from_thresholds(delay_chance, 0.7, 0.3),
        phases,
        insight: "Timeline analysis completed (Backend Fallback).".to_string(),
    }
}

pub fn dashboard_cost_forecast() -> PortfolioForecast {
    let forecast_data = (0..6)
        .map(|i| ForecastPoint {
            name: month(i),
            actual: PORTFOLIO_BASE * (0.8 + rand::random::<f64>() * 0.4),
            predicted: PORTFOLIO_BASE,
        })
        .collect();

    PortfolioForecast {
        forecast_data,
        insight: "Portfolio spending is within limits (Backend Fallback).".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn project(data: &Value) -> ProjectData<'_> {
        ProjectData(Some(data))
    }

    #[test]
    fn seed_sums_code_units() {
        // 'A' 'l' 'p' 'h' 'a'
        let seed = 65 + 108 + 112 + 104 + 97;
        let expected = {
            let x = (seed as f64 + 7.0).sin() * 10_000.0;
            x - x.floor()
        };
        assert_eq!(Seeded::from_name("Alpha").at(7), expected);
    }

    #[test]
    fn seed_follows_name_truthiness() {
        let seeded = |data: Value| Seeded::for_project(&ProjectData(Some(&data)));
        let default = Seeded::from_name(DEFAULT_NAME);

        assert_eq!(seeded(json!({ "name": "Alpha" })), Seeded::from_name("Alpha"));
        assert_eq!(seeded(json!({})), default);
        assert_eq!(seeded(json!({ "name": "" })), default);
        assert_eq!(seeded(json!({ "name": null })), default);
        assert_eq!(seeded(json!({ "name": 0 })), default);
        assert_eq!(seeded(json!({ "name": false })), default);
        assert_eq!(Seeded::for_project(&ProjectData(None)), default);

        let zero = Seeded { seed: 0.0 };
        assert_eq!(seeded(json!({ "name": 42 })), zero);
        assert_eq!(seeded(json!({ "name": true })), zero);
        assert_eq!(seeded(json!({ "name": { "first": "A" } })), zero);
    }

    #[test]
    fn numeric_name_gets_its_own_stable_fallback() {
        let numeric = json!({ "name": 42 });
        let defaulted = json!({});
        let first = risk_assessment(&project(&numeric));

        assert_eq!(first, risk_assessment(&project(&numeric)));
        assert_eq!(
            first.risk_score,
            (Seeded { seed: 0.0 }.at(25) * 100.0).floor() as u32
        );
        assert_eq!(
            risk_assessment(&project(&defaulted)).risk_score,
            (Seeded::from_name(DEFAULT_NAME).at(25) * 100.0).floor() as u32
        );
    }

    #[test]
    fn sequence_stays_in_unit_interval() {
        let random = Seeded::from_name("Default");
        for offset in 0..64 {
            let v = random.at(offset);
            assert!((0.0..1.0).contains(&v), "offset {offset} gave {v}");
        }
    }

    #[test]
    fn budget_parsing() {
        assert_eq!(budget(&project(&json!({ "budget": 2500 }))), 2500.0);
        assert_eq!(budget(&project(&json!({ "budget": " 1500usd" }))), 1500.0);
        assert_eq!(budget(&project(&json!({ "budget": "3.5e3" }))), 3500.0);
        assert_eq!(budget(&project(&json!({ "budget": ".5" }))), 0.5);
        assert_eq!(budget(&project(&json!({ "budget": "-200" }))), -200.0);
        assert_eq!(budget(&project(&json!({ "budget": "0" }))), DEFAULT_BUDGET);
        assert_eq!(budget(&project(&json!({ "budget": "abc" }))), DEFAULT_BUDGET);
        assert_eq!(budget(&project(&json!({ "budget": "1e" }))), 1.0);
        assert_eq!(budget(&project(&json!({ "budget": true }))), DEFAULT_BUDGET);
        assert_eq!(budget(&project(&json!({}))), DEFAULT_BUDGET);
        assert_eq!(budget(&ProjectData(None)), DEFAULT_BUDGET);
    }

    #[test]
    fn cost_forecast_is_deterministic() {
        let data = json!({ "name": "Alpha", "budget": 10000 });
        let first = serde_json::to_string(&cost_forecast(&project(&data))).unwrap();
        let second = serde_json::to_string(&cost_forecast(&project(&data))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn cost_forecast_follows_schedule() {
        let data = json!({ "name": "Alpha", "budget": 10000 });
        let forecast = cost_forecast(&project(&data));

        assert_eq!(forecast.forecast_data.len(), 6);
        assert_eq!(forecast.forecast_data[0].name, "Month 1");
        assert_eq!(forecast.forecast_data[5].name, "Month 6");
        assert!((forecast.forecast_data[1].actual - 2500.0).abs() < 1e-6);
        assert!((forecast.forecast_data[5].actual - 8500.0).abs() < 1e-6);
        for (point, share) in forecast.forecast_data.iter().zip(PREDICTED_SCHEDULE) {
            let variance = point.predicted / (10_000.0 * share);
            assert!((0.8..1.2).contains(&variance), "{}", point.name);
        }
        assert!((10_500.0..11_500.0).contains(&forecast.final_cost));
        assert!((5..20).contains(&forecast.overrun_percentage));
    }

    #[test]
    fn different_names_diverge() {
        let a = json!({ "name": "Alpha" });
        let b = json!({ "name": "Omega" });
        assert_ne!(
            resource_utilization(&project(&a)),
            resource_utilization(&project(&b))
        );
    }

    #[test]
    fn resource_utilization_ranges() {
        let data = json!({ "name": "Alpha" });
        let result = resource_utilization(&project(&data));

        assert!((70..95).contains(&result.utilization_score));
        assert!(result.pending_approvals < 5);
        let names: Vec<_> = result.heatmap.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["Dev Team", "QA Team", "Design"]);

        let ranges = [(60, 100), (50, 90), (40, 90)];
        for (row, (low, high)) in result.heatmap.iter().zip(ranges) {
            let days: Vec<_> = row.data.iter().map(|p| p.x.as_str()).collect();
            assert_eq!(days, WEEKDAYS);
            for point in &row.data {
                assert!((low..high).contains(&point.y), "{} {}", row.name, point.y);
            }
        }
    }

    #[test]
    fn risk_level_matches_score() {
        for name in ["Alpha", "Beta", "Gamma", "Delta", "Default", "Warehouse"] {
            let data = json!({ "name": name });
            let risk = risk_assessment(&project(&data));

            assert!(risk.risk_score < 100);
            let expected = if risk.risk_score > 75 {
                Level::High
            } else if risk.risk_score > 40 {
                Level::Medium
            } else {
                Level::Low
            };
            assert_eq!(risk.confidence_level, expected, "{name}");
            assert_eq!(risk.hotspots.len(), if risk.risk_score > 50 { 2 } else { 1 });
        }
    }

    #[test]
    fn timeline_uses_due_date_when_given() {
        let with_due = json!({ "name": "Alpha", "dueDate": "2026-03-01" });
        let without = json!({ "name": "Alpha" });

        let timeline = timeline_prediction(&project(&with_due));
        assert_eq!(timeline.predicted_completion, "2026-03-01");
        assert_eq!(
            timeline_prediction(&project(&without)).predicted_completion,
            DEFAULT_COMPLETION
        );

        let statuses: Vec<_> = timeline.phases.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(statuses, ["Planning", "Execution", "Testing"]);
        assert_eq!(timeline.phases[0].status, "Done");
        assert_eq!(timeline.phases[2].status, "Pending");
    }

    #[test]
    fn portfolio_fallback_stays_around_base() {
        let forecast = dashboard_cost_forecast();

        assert_eq!(forecast.forecast_data.len(), 6);
        for point in &forecast.forecast_data {
            assert_eq!(point.predicted, PORTFOLIO_BASE);
            assert!((40_000.0..60_000.0).contains(&point.actual));
        }
    }

    #[test]
    fn unknown_kind_yields_no_data() {
        let data = json!({ "name": "Alpha" });
        assert_eq!(generate("mystery", &project(&data)), AnalysisResult::no_data());
        assert!(matches!(
            generate("risk_assessment", &project(&data)),
            AnalysisResult::RiskAssessment(_)
        ));
    }
}
