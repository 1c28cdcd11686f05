use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{TextGenerator, UpstreamError};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// `generateContent` over HTTP. No timeout beyond the transport defaults.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, model: &str, api_key: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, model, api_key
        )
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<String, UpstreamError> {
        let request_body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });

        let resp = self
            .client
            .post(self.url(model, api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| UpstreamError::new(transport_message(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::new(format!("[{status}] {body}")));
        }

        let resp_json = resp
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::new(transport_message(&e)))?;

        response_text(&resp_json)
            .ok_or_else(|| UpstreamError::new("No text candidate in generateContent response"))
    }
}

// Strip the query string so the key never ends up in an error message.
fn transport_message(err: &reqwest::Error) -> String {
    let message = err.to_string();
    match err.url() {
        Some(url) => message.replace(url.as_str(), "<redacted>"),
        None => message,
    }
}

/// Concatenates every text part of the first candidate.
fn response_text(resp_json: &Value) -> Option<String> {
    let parts = resp_json["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
