use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use tracing::info;

use crate::generation::{
    gemini::DEFAULT_ENDPOINT,
    rotation::{DEFAULT_FALLBACK_MODEL, DEFAULT_MODEL},
    KeyPool, RetryPolicy,
};

pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_keys: KeyPool,
    pub model: String,
    pub fallback_model: String,
    pub endpoint: String,
    pub retry: RetryPolicy,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `load` reads the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let retries: u32 = try_load(&lookup, "AI_RETRIES", "2")?;
        let delay_ms: u64 = try_load(&lookup, "AI_RETRY_DELAY_MS", "1000")?;

        Ok(Self {
            host: try_load(&lookup, "HOST", "0.0.0.0")?,
            port: try_load(&lookup, "PORT", "5000")?,
            api_keys: KeyPool::parse(&lookup("GEMINI_API_KEY").unwrap_or_default()),
            model: try_load(&lookup, "GEMINI_MODEL", DEFAULT_MODEL)?,
            fallback_model: try_load(&lookup, "GEMINI_FALLBACK_MODEL", DEFAULT_FALLBACK_MODEL)?,
            endpoint: try_load(&lookup, "GEMINI_ENDPOINT", DEFAULT_ENDPOINT)?,
            retry: RetryPolicy {
                retries,
                initial_delay: Duration::from_millis(delay_ms),
            },
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("invalid {key} value: {raw}"))
}
