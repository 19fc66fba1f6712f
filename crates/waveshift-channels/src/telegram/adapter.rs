//! Telegram adapter core

use super::config::TelegramConfig;
use crate::error::Result;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
};
use waveshift_core::AudioFormat;

/// Telegram bot adapter
pub struct TelegramAdapter {
    pub(crate) bot: Bot,
    pub(crate) config: TelegramConfig,
}

impl TelegramAdapter {
    /// Create a new Telegram adapter
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        let bot = Bot::new(&config.bot_token);
        Self { bot, config }
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = TelegramConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Get the underlying bot
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Get the adapter configuration
    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// Caption attached to every converted file
    #[must_use]
    pub fn caption(bot_username: &str) -> String {
        format!("Here's your converted file! @{bot_username}")
    }

    /// Inline keyboard offering one button per target format.
    ///
    /// Uppercase labels; the lowercase identifier rides as the callback
    /// payload and comes back on the format-choice event.
    #[must_use]
    pub fn format_keyboard(formats: &[AudioFormat]) -> InlineKeyboardMarkup {
        let buttons: Vec<InlineKeyboardButton> = formats
            .iter()
            .map(|f| InlineKeyboardButton::callback(f.label(), f.as_str()))
            .collect();

        // Single row, matching the order the selector produced
        InlineKeyboardMarkup::new(vec![buttons])
    }

    /// Bot handle for the delivery caption, best effort
    pub(crate) async fn bot_username(&self) -> String {
        self.bot
            .get_me()
            .await
            .map(|me| me.username.clone().unwrap_or_default())
            .unwrap_or_default()
    }
}
