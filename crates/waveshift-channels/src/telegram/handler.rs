//! Telegram update handlers and the polling runner
//!
//! Both transports converge here: the polling dispatcher and the webhook
//! endpoint feed the same message/callback handlers, which translate
//! Telegram events into calls on the conversion core.

use super::adapter::TelegramAdapter;
use super::commands::handle_command;
use super::config::TransportMode;
use crate::error::Result;
use std::sync::Arc;
use teloxide::{
    net::Download,
    payloads::{SendAudioSetters, SendMessageSetters},
    prelude::*,
    types::{
        CallbackQuery, ChatAction, ChatId, FileId, InputFile, Message, ReplyParameters, Update,
        UpdateKind,
    },
};
use tracing::{debug, error, info, warn};
use waveshift_core::{AudioFormat, Converter, Delivery, Error as CoreError, IncomingAudio};

/// An audio-bearing attachment pulled off an inbound message
struct InboundAttachment {
    file_id: FileId,
    file_name: Option<String>,
    mime_type: Option<String>,
}

/// Pull the audio or voice attachment off a message, if it carries one
fn extract_audio(msg: &Message) -> Option<InboundAttachment> {
    if let Some(audio) = msg.audio() {
        return Some(InboundAttachment {
            file_id: audio.file.id.clone(),
            file_name: audio.file_name.clone(),
            mime_type: audio.mime_type.as_ref().map(|m| m.to_string()),
        });
    }

    if let Some(voice) = msg.voice() {
        // voice notes never declare a file name
        return Some(InboundAttachment {
            file_id: voice.file.id.clone(),
            file_name: None,
            mime_type: voice.mime_type.as_ref().map(|m| m.to_string()),
        });
    }

    None
}

impl TelegramAdapter {
    /// Run the long-polling dispatcher until shutdown.
    pub async fn run_polling(self: Arc<Self>, converter: Arc<Converter>) -> Result<()> {
        info!("Starting Telegram bot (long polling)");

        let bot = self.bot.clone();

        let msg_adapter = self.clone();
        let msg_converter = converter.clone();
        let cb_adapter = self.clone();
        let cb_converter = converter;

        let handler = dptree::entry()
            .branch(
                Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                    let adapter = msg_adapter.clone();
                    let converter = msg_converter.clone();
                    async move { Self::handle_message(adapter, converter, bot, msg).await }
                }),
            )
            .branch(
                Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                    let adapter = cb_adapter.clone();
                    let converter = cb_converter.clone();
                    async move { Self::handle_callback(adapter, converter, bot, q).await }
                }),
            );

        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }

    /// Route one update through the same handlers the poller uses.
    ///
    /// The webhook endpoint calls this with decoded payloads.
    pub(crate) async fn dispatch_update(
        adapter: Arc<Self>,
        converter: Arc<Converter>,
        bot: Bot,
        update: Update,
    ) {
        match update.kind {
            UpdateKind::Message(msg) => {
                if let Err(e) = Self::handle_message(adapter, converter, bot, msg).await {
                    error!(error = %e, "Message handler failed");
                }
            }
            UpdateKind::CallbackQuery(q) => {
                if let Err(e) = Self::handle_callback(adapter, converter, bot, q).await {
                    error!(error = %e, "Callback handler failed");
                }
            }
            _ => debug!("Ignoring unsupported update kind"),
        }
    }

    /// Handle an incoming message: slash commands and audio uploads.
    pub(crate) async fn handle_message(
        adapter: Arc<Self>,
        converter: Arc<Converter>,
        bot: Bot,
        msg: Message,
    ) -> ResponseResult<()> {
        if let Some(text) = msg.text() {
            let text = text.trim();
            if text.starts_with('/') {
                let command = text.split_whitespace().next().unwrap_or("");
                // Strip @bot_username suffix from commands (e.g. /start@mybot)
                let command = command.split('@').next().unwrap_or(command);

                if let Some(result) = handle_command(&bot, msg.chat.id, msg.id, command).await {
                    return result;
                }
            }
        }

        let Some(attachment) = extract_audio(&msg) else {
            return Ok(());
        };

        adapter.stage_upload(&bot, &converter, &msg, attachment).await;
        Ok(())
    }

    /// Download an uploaded file, stage it, and offer target formats.
    async fn stage_upload(
        &self,
        bot: &Bot,
        converter: &Converter,
        msg: &Message,
        attachment: InboundAttachment,
    ) {
        let chat_id = msg.chat.id;
        info!(
            chat_id = %chat_id,
            file_name = ?attachment.file_name,
            mime_type = ?attachment.mime_type,
            "Received audio upload"
        );

        let _ = bot.send_chat_action(chat_id, ChatAction::Typing).await;
        let ack = bot
            .send_message(chat_id, "Your audio file is being downloaded...")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await;

        match self.fetch_and_stage(bot, converter, chat_id.0, attachment).await {
            Ok(offered) => {
                // The webhook variant removes the ack once the fetch is
                // done; the polling variant leaves it visible.
                if self.config.mode == TransportMode::Webhook {
                    if let Ok(ref ack) = ack {
                        let _ = bot.delete_message(chat_id, ack.id).await;
                    }
                }

                let keyboard = Self::format_keyboard(&offered);
                if let Err(e) = bot
                    .send_message(chat_id, "Choose a format to convert to:")
                    .reply_markup(keyboard)
                    .await
                {
                    error!(chat_id = %chat_id, error = %e, "Failed to send format prompt");
                }
            }
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Failed to stage upload");
                let _ = bot.send_message(chat_id, e.user_message()).await;
            }
        }
    }

    /// Resolve and download the attachment, then hand it to the core.
    ///
    /// Both Telegram calls run under the fetch deadline; expiry and API
    /// failures are all fetch errors, and nothing gets staged on failure.
    async fn fetch_and_stage(
        &self,
        bot: &Bot,
        converter: &Converter,
        chat_id: i64,
        attachment: InboundAttachment,
    ) -> Result<Vec<AudioFormat>> {
        let deadline = self.config.fetch_timeout;

        let file = tokio::time::timeout(deadline, bot.get_file(attachment.file_id))
            .await
            .map_err(|_| CoreError::Fetch(format!("get_file timed out after {}s", deadline.as_secs())))?
            .map_err(|e| CoreError::Fetch(e.to_string()))?;

        let mut bytes = Vec::new();
        tokio::time::timeout(deadline, bot.download_file(&file.path, &mut bytes))
            .await
            .map_err(|_| CoreError::Fetch(format!("download timed out after {}s", deadline.as_secs())))?
            .map_err(|e| CoreError::Fetch(e.to_string()))?;

        // Fall back to the remote path's file name when none was declared
        let file_name = attachment
            .file_name
            .or_else(|| file.path.rsplit('/').next().map(str::to_string));

        let offered = converter
            .handle_upload(
                chat_id,
                IncomingAudio {
                    bytes,
                    file_name,
                    mime_type: attachment.mime_type,
                },
            )
            .await?;

        Ok(offered)
    }

    /// Handle a format-choice callback: convert and deliver.
    pub(crate) async fn handle_callback(
        adapter: Arc<Self>,
        converter: Arc<Converter>,
        bot: Bot,
        q: CallbackQuery,
    ) -> ResponseResult<()> {
        let _ = bot.answer_callback_query(q.id.clone()).await;

        let Some(data) = q.data.as_deref() else {
            debug!("Callback query without payload");
            return Ok(());
        };

        // Chat comes from the prompt message; queries whose message is no
        // longer accessible fall back to the sending user.
        let chat_id = q
            .message
            .as_ref()
            .map(|m| m.chat().id)
            .unwrap_or_else(|| ChatId(q.from.id.0 as i64));

        let Some(target) = AudioFormat::from_id(data) else {
            warn!(chat_id = %chat_id, data = %data, "Unknown format in callback payload");
            let _ = bot
                .send_message(
                    chat_id,
                    "I didn't understand that selection. Please upload your file again.",
                )
                .await;
            return Ok(());
        };

        info!(chat_id = %chat_id, target = %target, "Format chosen");

        // Replace the keyboard prompt with a progress note
        if let Some(prompt) = q.message.as_ref() {
            let _ = bot
                .edit_message_text(chat_id, prompt.id(), "Starting conversion...")
                .await;
        }

        match converter.handle_format_choice(chat_id.0, target).await {
            Ok(delivery) => adapter.deliver(&bot, chat_id, delivery).await,
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Conversion failed");
                let _ = bot.send_message(chat_id, e.user_message()).await;
            }
        }

        Ok(())
    }

    /// Send the converted file back, then let the scoped files clean up.
    async fn deliver(&self, bot: &Bot, chat_id: ChatId, delivery: Delivery) {
        let caption = Self::caption(&self.bot_username().await);
        let audio = InputFile::file(delivery.output.path().to_path_buf())
            .file_name(delivery.file_name.clone());

        let send = tokio::time::timeout(
            self.config.send_timeout,
            bot.send_audio(chat_id, audio).caption(caption),
        )
        .await;

        match send {
            Ok(Ok(sent)) => {
                info!(
                    chat_id = %chat_id,
                    message_id = %sent.id,
                    file_name = %delivery.file_name,
                    target = %delivery.target,
                    "Delivered converted file"
                );
            }
            Ok(Err(e)) => {
                error!(chat_id = %chat_id, error = %e, "Failed to send converted file");
                let message = CoreError::Delivery(e.to_string()).user_message();
                let _ = bot.send_message(chat_id, message).await;
            }
            Err(_) => {
                error!(
                    chat_id = %chat_id,
                    timeout_secs = self.config.send_timeout.as_secs(),
                    "Timed out sending converted file"
                );
                let message = CoreError::Delivery("send timed out".to_string()).user_message();
                let _ = bot.send_message(chat_id, message).await;
            }
        }
        // delivery drops here; source and output temp files are removed
    }
}
