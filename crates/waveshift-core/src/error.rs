//! Error types for waveshift-core
//!
//! One variant per failure kind in the conversion lifecycle, plus a
//! user-facing message mapping so handlers never leak internal detail.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Remote file could not be retrieved
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Source bytes are not a decodable audio container
    #[error("decode error: {0}")]
    Decode(String),

    /// Target encoder is unavailable or failed
    #[error("encode error: {0}")]
    Encode(String),

    /// Sending the converted file failed
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Format choice arrived with no staged file for the chat
    #[error("no staged file for this chat")]
    State,

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Local filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// User-facing message for this error, free of internal detail.
    ///
    /// Every taxonomy kind maps to a distinct message; [`Error::State`] is
    /// the recoverable one and asks for a re-upload.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Error::Fetch(_) => {
                "⬇️ I couldn't download that file. Please try sending it again.".to_string()
            }
            Error::Decode(_) => {
                "🎧 That file doesn't look like audio I can decode. Please send a valid audio file."
                    .to_string()
            }
            Error::Encode(_) => {
                "🔧 I couldn't convert to that format. Please try another one.".to_string()
            }
            Error::Delivery(_) => {
                "📤 I couldn't send the converted file back. Please try again.".to_string()
            }
            Error::State => {
                "🤔 I don't have a file waiting for conversion. Please upload an audio file first."
                    .to_string()
            }
            Error::InvalidConfig(_) | Error::Io(_) => {
                "Sorry, something went wrong. Please try again.".to_string()
            }
        }
    }
}
