//! Waveshift Channels - Telegram transport adapters
//!
//! Translates Telegram updates into calls on the transport-agnostic
//! conversion core, over either of two interchangeable transports:
//! - long polling (via the teloxide dispatcher)
//! - a webhook endpoint served by axum

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod telegram;

pub use error::{Error, Result};
pub use telegram::{TelegramAdapter, TelegramConfig, TransportMode};
