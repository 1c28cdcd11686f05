//! Calls into the generative text API.
//!
//! [`TextGenerator`] is the seam between the rotation logic and the wire:
//! production code talks to Gemini through [`gemini::GeminiClient`], tests
//! script the responses.

pub mod gemini;
pub mod rotation;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;
pub use rotation::{GenerationClient, GenerationError, KeyCursor, KeyPool, RetryPolicy};

/// One text-generation call: `(api key, model, prompt) -> text`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, api_key: &str, model: &str, prompt: &str)
        -> Result<String, UpstreamError>;
}

/// Failure reported by the upstream API. Only the message is inspected.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct UpstreamError {
    message: String,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> FailureKind {
        classify(&self.message)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    /// The key's allowance is used up; move to the next key.
    Quota,
    /// Transient unavailability; worth retrying the same key.
    Overload,
    Other,
}

pub fn classify(message: &str) -> FailureKind {
    let lower = message.to_ascii_lowercase();
    if lower.contains("429") || lower.contains("quota") {
        FailureKind::Quota
    } else if lower.contains("503") || lower.contains("overload") {
        FailureKind::Overload
    } else {
        FailureKind::Other
    }
}
