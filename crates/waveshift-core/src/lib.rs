//! Waveshift Core - conversion request lifecycle
//!
//! Transport-agnostic core of the Waveshift bot: per-chat session state,
//! the target-format catalog, scoped temp-file staging, and the
//! ffmpeg-backed conversion engine. Transport adapters translate platform
//! events into `handle_upload` / `handle_format_choice` calls on
//! [`Converter`] and deliver the resulting [`Delivery`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod session;
pub mod staging;
pub mod transcode;

pub use config::CoreConfig;
pub use convert::{Converter, Delivery, IncomingAudio};
pub use error::{Error, Result};
pub use format::{offerable, AudioFormat, CATALOG};
pub use session::{ConversionRequest, SessionStore};
pub use staging::StagedFile;
pub use transcode::Transcoder;
