//! Telegram configuration types

use crate::error::{Error, Result};
use std::time::Duration;
use url::Url;

/// Default webhook listen port
const DEFAULT_WEBHOOK_PORT: u16 = 5000;

/// Default attachment download deadline in seconds
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Default converted-file send deadline in seconds
const DEFAULT_SEND_TIMEOUT_SECS: u64 = 60;

/// How the bot receives updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Continuously long-poll Telegram for updates
    #[default]
    Polling,
    /// Receive updates pushed to an HTTP endpoint
    Webhook,
}

/// Telegram bot configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token
    pub bot_token: String,
    /// How updates are received
    pub mode: TransportMode,
    /// Port the webhook server listens on
    pub webhook_port: u16,
    /// Publicly reachable base URL registered with Telegram (webhook mode)
    pub public_url: Option<Url>,
    /// Deadline for downloading an attachment
    pub fetch_timeout: Duration,
    /// Deadline for sending the converted file
    pub send_timeout: Duration,
}

impl TelegramConfig {
    /// Create from environment variables.
    ///
    /// `TELEGRAM_BOT_TOKEN` is required; `PORT`, `WAVESHIFT_PUBLIC_URL`,
    /// `WAVESHIFT_FETCH_TIMEOUT_SECS` and `WAVESHIFT_SEND_TIMEOUT_SECS`
    /// are optional.
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| Error::Telegram("TELEGRAM_BOT_TOKEN not set".to_string()))?;

        let webhook_port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Parse("PORT must be a port number".to_string()))?,
            Err(_) => DEFAULT_WEBHOOK_PORT,
        };

        let public_url = match std::env::var("WAVESHIFT_PUBLIC_URL") {
            Ok(raw) => Some(raw.parse().map_err(|_| {
                Error::Parse("WAVESHIFT_PUBLIC_URL is not a valid URL".to_string())
            })?),
            Err(_) => None,
        };

        let fetch_timeout = timeout_env("WAVESHIFT_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?;
        let send_timeout = timeout_env("WAVESHIFT_SEND_TIMEOUT_SECS", DEFAULT_SEND_TIMEOUT_SECS)?;

        Ok(Self {
            bot_token,
            mode: TransportMode::default(),
            webhook_port,
            public_url,
            fetch_timeout,
            send_timeout,
        })
    }

    /// Create with a bot token and defaults for everything else
    #[must_use]
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            mode: TransportMode::default(),
            webhook_port: DEFAULT_WEBHOOK_PORT,
            public_url: None,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            send_timeout: Duration::from_secs(DEFAULT_SEND_TIMEOUT_SECS),
        }
    }

    /// Set the transport mode
    #[must_use]
    pub fn with_mode(mut self, mode: TransportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the webhook listen port
    #[must_use]
    pub fn with_webhook_port(mut self, port: u16) -> Self {
        self.webhook_port = port;
        self
    }

    /// Set the public base URL for webhook registration
    #[must_use]
    pub fn with_public_url(mut self, url: Url) -> Self {
        self.public_url = Some(url);
        self
    }

    /// Set the attachment download deadline
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the converted-file send deadline
    #[must_use]
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }
}

fn timeout_env(var: &str, default_secs: u64) -> Result<Duration> {
    match std::env::var(var) {
        Ok(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| Error::Parse(format!("{var} must be a number of seconds")))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}
