//! The five analytics kinds and everything keyed on them.
//!
//! [`AnalysisKind`] is the dispatch point: each variant knows how to build
//! its prompt ([`prompt`]) and how to synthesize a stand-in answer when the
//! upstream model is unreachable ([`fallback`]). The response shapes live in
//! [`schema`].

pub mod fallback;
pub mod prompt;
pub mod schema;

use serde::Deserialize;
use serde_json::Value;

pub use prompt::PromptError;
pub use schema::AnalysisResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    CostForecast,
    ResourceUtilization,
    RiskAssessment,
    TimelinePrediction,
    DashboardCostForecast,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::CostForecast,
        AnalysisKind::ResourceUtilization,
        AnalysisKind::RiskAssessment,
        AnalysisKind::TimelinePrediction,
        AnalysisKind::DashboardCostForecast,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::CostForecast => "cost_forecast",
            AnalysisKind::ResourceUtilization => "resource_utilization",
            AnalysisKind::RiskAssessment => "risk_assessment",
            AnalysisKind::TimelinePrediction => "timeline_prediction",
            AnalysisKind::DashboardCostForecast => "dashboard_cost_forecast",
        }
    }

    pub fn prompt(self, request: &AnalysisRequest) -> Result<String, PromptError> {
        let project = request.project();
        match self {
            AnalysisKind::CostForecast => prompt::cost_forecast(&project.require()?),
            AnalysisKind::ResourceUtilization => {
                prompt::resource_utilization(&project.require()?)
            }
            AnalysisKind::RiskAssessment => prompt::risk_assessment(&project.require()?),
            AnalysisKind::TimelinePrediction => prompt::timeline_prediction(&project.require()?),
            AnalysisKind::DashboardCostForecast => {
                prompt::dashboard_cost_forecast(request.portfolio()?)
            }
        }
    }

    pub fn fallback(self, project: &ProjectData<'_>) -> AnalysisResult {
        match self {
            AnalysisKind::CostForecast => fallback::cost_forecast(project).into(),
            AnalysisKind::ResourceUtilization => fallback::resource_utilization(project).into(),
            AnalysisKind::RiskAssessment => fallback::risk_assessment(project).into(),
            AnalysisKind::TimelinePrediction => fallback::timeline_prediction(project).into(),
            AnalysisKind::DashboardCostForecast => fallback::dashboard_cost_forecast().into(),
        }
    }
}

/// Body of `POST /api/predict/ai`. Fields are kept loose: nothing is
/// validated beyond what each kind reads, and a `type` that is not a string
/// is simply unrecognized.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<Value>,
    #[serde(rename = "projectData", default)]
    pub project_data: Option<Value>,
    #[serde(default)]
    pub projects: Option<Value>,
}

impl AnalysisRequest {
    pub fn kind_name(&self) -> Option<&str> {
        self.kind.as_ref().and_then(Value::as_str)
    }

    pub fn analysis_kind(&self) -> Option<AnalysisKind> {
        self.kind_name().and_then(AnalysisKind::parse)
    }

    pub fn project(&self) -> ProjectData<'_> {
        ProjectData(self.project_data.as_ref())
    }

    fn portfolio(&self) -> Result<&[Value], PromptError> {
        match &self.projects {
            None => Ok(&[]),
            Some(Value::Array(projects)) => Ok(projects),
            Some(_) => Err(PromptError::ProjectsNotArray),
        }
    }
}

/// Read-only view over a project object. Absent or non-object data reads as
/// if every field were missing.
#[derive(Clone, Copy, Debug)]
pub struct ProjectData<'a>(pub Option<&'a Value>);

impl<'a> ProjectData<'a> {
    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    fn require(self) -> Result<Self, PromptError> {
        if self.is_present() {
            Ok(self)
        } else {
            Err(PromptError::MissingProjectData)
        }
    }

    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.0.and_then(|data| data.get(name))
    }

    /// Field as it reads inside a prompt.
    pub fn render(&self, name: &str) -> String {
        render_value(self.field(name))
    }
}

pub(crate) fn render_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
