//! Schedra AI analytics backend.
//!
//! `POST /api/predict/ai` turns project data into a prompt for a Gemini
//! model, rotates through the configured API keys when they hit their quota,
//! and parses the model's text back into JSON. When the model cannot be
//! reached at all, a locally generated stand-in answer keeps the dashboard
//! populated.
//!
//! # Configuration
//!
//! | variable | default |
//! |---|---|
//! | `GEMINI_API_KEY` | comma separated keys, required for analytics |
//! | `HOST` / `PORT` | `0.0.0.0` / `5000` |
//! | `GEMINI_MODEL` | `gemini-2.5-flash` |
//! | `GEMINI_FALLBACK_MODEL` | `gemini-flash-latest` |
//! | `GEMINI_ENDPOINT` | `https://generativelanguage.googleapis.com/v1beta` |
//! | `AI_RETRIES` / `AI_RETRY_DELAY_MS` | `2` / `1000` |
//!
//! Logging goes through `tracing`; set `RUST_LOG` to adjust.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

pub mod analysis;
pub mod config;
pub mod error;
pub mod extract;
pub mod generation;
pub mod routes;
pub mod state;

use config::Config;
use routes::{analytics_handler, health_handler};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health_handler))
        .route("/api/predict/ai", post(analytics_handler))
        .layer(cors)
        .layer(middleware::from_fn(log_http_request))
        .with_state(state)
}

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    log_key_status(&config);

    let state = AppState::new(&config);
    let address = config.address();

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down");
    Ok(())
}

fn log_key_status(config: &Config) {
    match config.api_keys.get(0) {
        Some(first) => {
            let prefix: String = first.chars().take(6).collect();
            info!(
                keys = config.api_keys.len(),
                "GEMINI_API_KEY present ({prefix}...)"
            );
        }
        None => error!("GEMINI_API_KEY missing, analytics requests will fail"),
    }
}

async fn log_http_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        "http request"
    );
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
