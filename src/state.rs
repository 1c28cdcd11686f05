use std::sync::Arc;

use crate::{
    config::Config,
    generation::{GeminiClient, GenerationClient},
};

pub struct AppState {
    pub client: GenerationClient,
}

impl AppState {
    pub fn new(config: &Config) -> Arc<Self> {
        let client = GenerationClient::new(
            Arc::new(GeminiClient::new(config.endpoint.clone())),
            config.api_keys.clone(),
        )
        .with_policy(config.retry)
        .with_models(config.model.clone(), config.fallback_model.clone());

        Self::with_client(client)
    }

    pub fn with_client(client: GenerationClient) -> Arc<Self> {
        Arc::new(Self { client })
    }
}
