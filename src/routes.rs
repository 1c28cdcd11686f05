use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

use crate::{
    analysis::{fallback, AnalysisRequest},
    error::AppError,
    extract::extract_json,
    generation::GenerationError,
    state::AppState,
};

const PREVIEW_CHARS: usize = 100;

pub async fn health_handler() -> &'static str {
    "Schedra API is running..."
}

/// `POST /api/predict/ai`
pub async fn analytics_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Response {
    match analyze(&state, &request).await {
        Ok(response) => response,
        Err(AppError::Internal(e)) => {
            error!(error = %e, "critical analytics error");

            match (request.kind_name(), request.project_data.is_some()) {
                (Some(kind), true) => {
                    warn!(kind, "serving fallback data after critical error");
                    Json(fallback::generate(kind, &request.project())).into_response()
                }
                _ => AppError::Internal(e).into_response(),
            }
        }
        Err(e) => e.into_response(),
    }
}

async fn analyze(state: &AppState, request: &AnalysisRequest) -> Result<Response, AppError> {
    let keys = state.client.key_count();
    info!(kind = ?request.kind, keys, "new AI request");

    if keys == 0 {
        error!("no API keys configured");
        return Err(AppError::MissingApiKeys);
    }

    let kind = request
        .analysis_kind()
        .ok_or(AppError::InvalidPredictionType)?;
    let prompt = kind.prompt(request)?;

    let text = match state.client.generate(&prompt).await {
        Ok(text) => text,
        Err(GenerationError::Configuration) => return Err(AppError::MissingApiKeys),
        Err(e) => {
            error!(error = %e, "AI generation failed");
            warn!(kind = kind.as_str(), "serving fallback data");
            return Ok(Json(kind.fallback(&request.project())).into_response());
        }
    };

    let preview: String = text.chars().take(PREVIEW_CHARS).collect();
    info!(%preview, "model response");

    match extract_json(&text) {
        Ok(data) => Ok(Json(data).into_response()),
        Err(e) => {
            error!(error = %e, %text, "model returned malformed JSON");
            Err(e.into())
        }
    }
}
