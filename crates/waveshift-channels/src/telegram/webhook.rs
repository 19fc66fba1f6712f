//! Webhook transport: an axum server Telegram pushes updates to
//!
//! One POST endpoint at a path derived from the bot's secret token, plus a
//! health check. Decoded updates go through the same handlers as polling.

use super::adapter::TelegramAdapter;
use crate::error::{Error, Result};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::{prelude::*, types::Update};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use waveshift_core::Converter;

/// Fixed acknowledgment body returned for every webhook POST
const WEBHOOK_ACK: &str = "OK";

/// Health check payload
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

impl TelegramAdapter {
    /// Webhook endpoint path, derived from the bot's secret token.
    #[must_use]
    pub fn webhook_path(&self) -> String {
        format!("/webhook/{}", self.config.bot_token)
    }

    /// Register the webhook with Telegram and serve updates until shutdown.
    ///
    /// Requires a configured public base URL; the endpoint URL handed to
    /// Telegram is `<public_url>/webhook/<token>`.
    pub async fn run_webhook(self: Arc<Self>, converter: Arc<Converter>) -> Result<()> {
        let public_url = self.config.public_url.clone().ok_or_else(|| {
            Error::Telegram("WAVESHIFT_PUBLIC_URL must be set in webhook mode".to_string())
        })?;
        let endpoint = public_url
            .join(self.webhook_path().trim_start_matches('/'))
            .map_err(|e| Error::Parse(format!("invalid webhook URL: {e}")))?;

        self.bot
            .set_webhook(endpoint)
            .await
            .map_err(|e| Error::Telegram(format!("set_webhook failed: {e}")))?;
        info!("Webhook registered with Telegram");

        let app = Router::new()
            .route("/health", get(health))
            .route("/webhook/:token", post(receive_update))
            .layer(Extension(self.clone()))
            .layer(Extension(converter))
            .layer(TraceLayer::new_for_http());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.webhook_port));
        info!(%addr, "Webhook server listening");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Telegram(format!("failed to bind {addr}: {e}")))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Telegram(format!("webhook server error: {e}")))?;

        Ok(())
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Accept a pushed update and route it through the shared handlers.
async fn receive_update(
    Path(token): Path<String>,
    Extension(adapter): Extension<Arc<TelegramAdapter>>,
    Extension(converter): Extension<Arc<Converter>>,
    Json(payload): Json<Value>,
) -> (StatusCode, &'static str) {
    if token != adapter.config().bot_token {
        warn!("Webhook POST with wrong token path");
        return (StatusCode::NOT_FOUND, "");
    }

    match serde_json::from_value::<Update>(payload) {
        Ok(update) => {
            let bot = adapter.bot().clone();
            TelegramAdapter::dispatch_update(adapter, converter, bot, update).await;
        }
        Err(e) => warn!(error = %e, "Discarding malformed update payload"),
    }

    // Telegram retries on anything but a 2xx, so always acknowledge
    (StatusCode::OK, WEBHOOK_ACK)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
