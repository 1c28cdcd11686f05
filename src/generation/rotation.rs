//! Key rotation with bounded retry and a fallback model.
//!
//! For every key, starting at the shared [`KeyCursor`]:
//!
//! - quota errors abandon the key and move on to the next one
//! - overload errors back off (doubling) and retry the same key while
//!   attempts remain
//! - anything else aborts the whole rotation
//!
//! When every key is rate-limited, one last call goes to the fallback model
//! with the first key.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{FailureKind, TextGenerator, UpstreamError};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-flash-latest";

/// Ordered credentials, parsed from a comma delimited value.
#[derive(Clone, Debug, Default)]
pub struct KeyPool {
    keys: Vec<String>,
}

impl KeyPool {
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }
}

/// First 8 characters of a key, for logs.
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(8).collect();
    format!("{prefix}...")
}

/// Index of the last key that succeeded. Only a starting hint for the next
/// rotation, so relaxed ordering is enough. Clones share the same index.
#[derive(Clone, Debug, Default)]
pub struct KeyCursor(Arc<AtomicUsize>);

impl KeyCursor {
    pub fn new(start: usize) -> Self {
        Self(Arc::new(AtomicUsize::new(start)))
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, index: usize) {
        self.0.store(index, Ordering::Relaxed);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per key against the primary model. Zero behaves as one.
    pub retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API keys configured")]
    Configuration,

    #[error("all {keys} keys rate-limited and fallback model failed: {source}")]
    QuotaExhaustedThenFallbackFailure {
        keys: usize,
        #[source]
        source: UpstreamError,
    },

    #[error("upstream generation failed: {0}")]
    Unclassified(#[source] UpstreamError),
}

/// Where one call sits inside the rotation.
struct GenerationAttempt<'a> {
    key_index: usize,
    model: &'a str,
    retry: u32,
    waited: Duration,
}

pub struct GenerationClient {
    generator: Arc<dyn TextGenerator>,
    keys: KeyPool,
    cursor: KeyCursor,
    policy: RetryPolicy,
    model: String,
    fallback_model: String,
}

impl GenerationClient {
    pub fn new(generator: Arc<dyn TextGenerator>, keys: KeyPool) -> Self {
        Self {
            generator,
            keys,
            cursor: KeyCursor::default(),
            policy: RetryPolicy::default(),
            model: DEFAULT_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
        }
    }

    pub fn with_cursor(mut self, cursor: KeyCursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_models(
        mut self,
        model: impl Into<String>,
        fallback_model: impl Into<String>,
    ) -> Self {
        self.model = model.into();
        self.fallback_model = fallback_model.into();
        self
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn cursor(&self) -> &KeyCursor {
        &self.cursor
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let key_count = self.keys.len();
        let Some(first_key) = self.keys.get(0) else {
            return Err(GenerationError::Configuration);
        };

        let start = self.cursor.get();
        let attempts = self.policy.retries.max(1);
        // backoff keeps doubling across keys for the whole call
        let mut delay = self.policy.initial_delay;
        let mut waited = Duration::ZERO;

        for k in 0..key_count {
            let key_index = (start + k) % key_count;
            let Some(key) = self.keys.get(key_index) else {
                continue;
            };
            info!(key = key_index + 1, masked = %mask_key(key), "trying key");

            for retry in 0..attempts {
                let attempt = GenerationAttempt {
                    key_index,
                    model: &self.model,
                    retry,
                    waited,
                };
                debug!(
                    key = attempt.key_index + 1,
                    model = attempt.model,
                    retry = attempt.retry,
                    waited_ms = attempt.waited.as_millis() as u64,
                    "requesting model"
                );

                let err = match self.generator.generate(key, &self.model, prompt).await {
                    Ok(text) => {
                        self.cursor.set(key_index);
                        return Ok(text);
                    }
                    Err(err) => err,
                };

                match err.kind() {
                    FailureKind::Quota => {
                        warn!(
                            key = key_index + 1,
                            model = %self.model,
                            "quota exceeded, rotating key"
                        );
                        break;
                    }
                    FailureKind::Overload if retry + 1 < attempts => {
                        warn!(
                            key = key_index + 1,
                            delay_ms = delay.as_millis() as u64,
                            "model overloaded, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        waited += delay;
                        delay *= 2;
                    }
                    _ => {
                        warn!(key = key_index + 1, error = %err, "unrecoverable upstream error");
                        return Err(GenerationError::Unclassified(err));
                    }
                }
            }
        }

        error!(
            keys = key_count,
            model = %self.model,
            fallback = %self.fallback_model,
            "all keys exhausted, falling back to stable model"
        );
        self.generator
            .generate(first_key, &self.fallback_model, prompt)
            .await
            .map_err(|source| GenerationError::QuotaExhaustedThenFallbackFailure {
                keys: key_count,
                source,
            })
    }
}
