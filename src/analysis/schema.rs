use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// `High` strictly above `high`, `Medium` strictly above `medium`.
    pub fn from_thresholds(value: f64, high: f64, medium: f64) -> Self {
        if value > high {
            Level::High
        } else if value > medium {
            Level::Medium
        } else {
            Level::Low
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub name: String,
    #[serde(rename = "Actual")]
    pub actual: f64,
    #[serde(rename = "Predicted")]
    pub predicted: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostForecast {
    pub forecast_data: Vec<ForecastPoint>,
    pub final_cost: f64,
    pub overrun_percentage: u32,
    pub insight: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub x: String,
    pub y: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRow {
    pub name: String,
    pub data: Vec<HeatPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUtilization {
    pub utilization_score: u32,
    pub heatmap: Vec<HeatmapRow>,
    pub pending_approvals: u32,
    pub insight: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_score: u32,
    pub confidence_level: Level,
    pub hotspots: Vec<String>,
    pub insight: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePrediction {
    pub predicted_completion: String,
    pub delay_probability: Level,
    pub phases: Vec<Phase>,
    pub insight: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioForecast {
    pub forecast_data: Vec<ForecastPoint>,
    pub insight: String,
}

/// Any locally produced answer. Serializes as the bare inner object.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    CostForecast(CostForecast),
    ResourceUtilization(ResourceUtilization),
    RiskAssessment(RiskAssessment),
    TimelinePrediction(TimelinePrediction),
    PortfolioForecast(PortfolioForecast),
    NoData { message: String },
}

impl AnalysisResult {
    pub fn no_data() -> Self {
        AnalysisResult::NoData {
            message: "No data available".to_string(),
        }
    }
}

macro_rules! impl_from_result {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for AnalysisResult {
                fn from(value: $variant) -> Self {
                    AnalysisResult::$variant(value)
                }
            }
        )*
    };
}

impl_from_result!(
    CostForecast,
    ResourceUtilization,
    RiskAssessment,
    TimelinePrediction,
    PortfolioForecast
);
