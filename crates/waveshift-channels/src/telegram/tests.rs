//! Tests for telegram module

use super::*;
use std::time::Duration;
use teloxide::types::InlineKeyboardButtonKind;
use waveshift_core::{offerable, AudioFormat};

#[test]
fn test_telegram_config_defaults() {
    let config = TelegramConfig::new("test_token");

    assert_eq!(config.bot_token, "test_token");
    assert_eq!(config.mode, TransportMode::Polling);
    assert_eq!(config.webhook_port, 5000);
    assert!(config.public_url.is_none());
}

#[test]
fn test_telegram_config_builders() {
    let url: url::Url = "https://bot.example.com".parse().unwrap();
    let config = TelegramConfig::new("test_token")
        .with_mode(TransportMode::Webhook)
        .with_webhook_port(8443)
        .with_public_url(url.clone())
        .with_fetch_timeout(Duration::from_secs(10))
        .with_send_timeout(Duration::from_secs(20));

    assert_eq!(config.mode, TransportMode::Webhook);
    assert_eq!(config.webhook_port, 8443);
    assert_eq!(config.public_url, Some(url));
    assert_eq!(config.fetch_timeout, Duration::from_secs(10));
    assert_eq!(config.send_timeout, Duration::from_secs(20));
}

#[test]
fn test_format_keyboard_labels_and_payloads() {
    let keyboard = TelegramAdapter::format_keyboard(&[AudioFormat::Mp3, AudioFormat::Wav]);

    assert_eq!(keyboard.inline_keyboard.len(), 1);
    let row = &keyboard.inline_keyboard[0];
    assert_eq!(row.len(), 2);

    assert_eq!(row[0].text, "MP3");
    match &row[0].kind {
        InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "mp3"),
        other => panic!("unexpected button kind: {other:?}"),
    }

    assert_eq!(row[1].text, "WAV");
    match &row[1].kind {
        InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "wav"),
        other => panic!("unexpected button kind: {other:?}"),
    }
}

#[test]
fn test_keyboard_payloads_round_trip_through_parser() {
    let keyboard = TelegramAdapter::format_keyboard(&offerable(Some(AudioFormat::Mp3)));

    for button in &keyboard.inline_keyboard[0] {
        let InlineKeyboardButtonKind::CallbackData(data) = &button.kind else {
            panic!("expected callback button");
        };
        let parsed = AudioFormat::from_id(data).expect("payload must parse back");
        assert_eq!(parsed.label(), button.text);
    }
}

#[test]
fn test_caption_contains_bot_handle() {
    let caption = TelegramAdapter::caption("waveshift_bot");
    assert_eq!(caption, "Here's your converted file! @waveshift_bot");
}

#[test]
fn test_webhook_path_derived_from_token() {
    let adapter = TelegramAdapter::new(TelegramConfig::new("123456:TEST-TOKEN"));
    assert_eq!(adapter.webhook_path(), "/webhook/123456:TEST-TOKEN");
}
