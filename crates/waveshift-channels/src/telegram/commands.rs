//! Telegram slash command handlers

use teloxide::{
    payloads::SendMessageSetters,
    prelude::*,
    types::{ChatId, MessageId, ReplyParameters},
};
use tracing::{info, warn};
use waveshift_core::CATALOG;

/// Welcome text sent for /start
const WELCOME: &str = "\u{1F3B6} Welcome to the Waveshift music converter! \u{1F3B5}\n\n\
Easily convert your favorite music files into formats like MP3, OPUS, WAV, and AAC. \
Just upload a file, and we'll handle the rest! \u{1F680}";

/// Handle a slash command (e.g. /start, /formats).
///
/// Returns `None` for commands this bot doesn't know, so the caller can
/// fall through to attachment handling.
pub async fn handle_command(
    bot: &Bot,
    chat_id: ChatId,
    reply_to: MessageId,
    command: &str,
) -> Option<ResponseResult<()>> {
    info!(%command, %chat_id, "Processing slash command");

    let response = match command {
        "/start" => WELCOME.to_string(),
        "/formats" => {
            let labels: Vec<&str> = CATALOG.iter().map(|f| f.label()).collect();
            format!("Supported target formats: {}", labels.join(", "))
        }
        _ => return None,
    };

    if let Err(e) = bot
        .send_message(chat_id, response)
        .reply_parameters(ReplyParameters::new(reply_to))
        .await
    {
        warn!(%chat_id, error = %e, "Failed to send command reply");
    }

    Some(Ok(()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_names_every_catalog_format() {
        for format in CATALOG {
            assert!(WELCOME.contains(format.label()), "{}", format.label());
        }
    }
}
