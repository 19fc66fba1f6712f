//! Audio format catalog and target-format selection

use serde::{Deserialize, Serialize};

/// A supported target audio format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG layer III
    Mp3,
    /// Opus in an Ogg container
    Opus,
    /// PCM WAV
    Wav,
    /// AAC in an ADTS stream
    Aac,
}

/// The fixed set of offerable target formats
pub const CATALOG: [AudioFormat; 4] = [
    AudioFormat::Mp3,
    AudioFormat::Opus,
    AudioFormat::Wav,
    AudioFormat::Aac,
];

impl AudioFormat {
    /// Lowercase identifier, used as callback payload and file extension
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Wav => "wav",
            Self::Aac => "aac",
        }
    }

    /// Uppercase button label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Opus => "OPUS",
            Self::Wav => "WAV",
            Self::Aac => "AAC",
        }
    }

    /// File extension for converted output
    #[must_use]
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Parse a lowercase identifier, as carried in callback payloads
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "mp3" => Some(Self::Mp3),
            "opus" => Some(Self::Opus),
            "wav" => Some(Self::Wav),
            "aac" => Some(Self::Aac),
            _ => None,
        }
    }

    /// Recognize a format from a declared MIME type.
    ///
    /// Accepts a full type ("audio/mpeg") or a bare subtype ("mpeg").
    /// Subtype aliases map onto catalog members; anything else is
    /// unrecognized and yields `None`.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        let subtype = mime.rsplit('/').next().unwrap_or(mime);
        match subtype.to_ascii_lowercase().as_str() {
            "mp3" | "mpeg" | "mpga" => Some(Self::Mp3),
            "opus" | "ogg" => Some(Self::Opus),
            "wav" | "x-wav" | "wave" | "vnd.wave" => Some(Self::Wav),
            "aac" | "x-aac" | "aacp" => Some(Self::Aac),
            _ => None,
        }
    }

    /// ffmpeg audio codec arguments for this target
    pub(crate) fn codec_args(&self) -> &'static [&'static str] {
        match self {
            Self::Mp3 => &["-codec:a", "libmp3lame"],
            Self::Opus => &["-codec:a", "libopus"],
            Self::Wav => &["-codec:a", "pcm_s16le"],
            Self::Aac => &["-codec:a", "aac"],
        }
    }

    /// ffmpeg output muxer for this target
    pub(crate) fn muxer(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "ogg",
            Self::Wav => "wav",
            Self::Aac => "adts",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Target formats offerable for a file of the given source format.
///
/// The source format is excluded from the catalog; an unrecognized source
/// offers the full catalog, since excluding an unknown format is
/// meaningless. Never empty.
#[must_use]
pub fn offerable(source: Option<AudioFormat>) -> Vec<AudioFormat> {
    match source {
        Some(src) => CATALOG.iter().copied().filter(|f| *f != src).collect(),
        None => CATALOG.to_vec(),
    }
}
