use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::{analysis::PromptError, extract::ExtractError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Server misconfiguration: Missing API Keys")]
    MissingApiKeys,

    #[error("Invalid prediction type")]
    InvalidPredictionType,

    #[error("AI response format was invalid")]
    InvalidResponseFormat(#[from] ExtractError),

    #[error("Critical internal error")]
    Internal(#[from] PromptError),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidPredictionType => StatusCode::BAD_REQUEST,
            AppError::MissingApiKeys
            | AppError::InvalidResponseFormat(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            AppError::InvalidResponseFormat(e) => Some(e.source.to_string()),
            AppError::Internal(e) => Some(e.to_string()),
            AppError::MissingApiKeys | AppError::InvalidPredictionType => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.to_string(),
            error: self.detail(),
        };

        (self.status(), Json(body)).into_response()
    }
}
