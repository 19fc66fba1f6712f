//! Error types for waveshift-channels

use thiserror::Error;

/// Channel error type
#[derive(Debug, Error)]
pub enum Error {
    /// Telegram API error
    #[error("telegram error: {0}")]
    Telegram(String),

    /// Event payload parsing error
    #[error("message parsing error: {0}")]
    Parse(String),

    /// Core conversion error
    #[error(transparent)]
    Core(#[from] waveshift_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// User-facing message for this error, free of internal detail.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Error::Core(e) => e.user_message(),
            Error::Parse(_) => {
                "I didn't understand that selection. Please upload your file again.".to_string()
            }
            Error::Telegram(_) => "Sorry, something went wrong. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_their_user_message() {
        let err = Error::from(waveshift_core::Error::State);
        assert_eq!(err.user_message(), waveshift_core::Error::State.user_message());
    }

    #[test]
    fn test_telegram_error_is_generic_to_users() {
        let err = Error::Telegram("401 Unauthorized: token 123:abc".to_string());
        assert!(!err.user_message().contains("token"));
    }
}
