//! Core configuration types

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default per-conversion deadline in seconds
const DEFAULT_CONVERT_TIMEOUT_SECS: u64 = 120;

/// Conversion core configuration
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory staged and converted files are written to
    pub work_dir: PathBuf,
    /// ffmpeg executable to invoke
    pub ffmpeg_bin: String,
    /// Deadline for a single conversion
    pub convert_timeout: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            ffmpeg_bin: "ffmpeg".to_string(),
            convert_timeout: Duration::from_secs(DEFAULT_CONVERT_TIMEOUT_SECS),
        }
    }
}

impl CoreConfig {
    /// Create from environment variables.
    ///
    /// Reads `WAVESHIFT_WORK_DIR`, `WAVESHIFT_FFMPEG_BIN` and
    /// `WAVESHIFT_CONVERT_TIMEOUT_SECS`; every variable is optional.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("WAVESHIFT_WORK_DIR") {
            config.work_dir = PathBuf::from(dir);
        }
        if let Ok(bin) = std::env::var("WAVESHIFT_FFMPEG_BIN") {
            config.ffmpeg_bin = bin;
        }
        if let Ok(raw) = std::env::var("WAVESHIFT_CONVERT_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::InvalidConfig(
                    "WAVESHIFT_CONVERT_TIMEOUT_SECS must be a number of seconds".to_string(),
                )
            })?;
            config.convert_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Set the working directory
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Set the ffmpeg executable
    #[must_use]
    pub fn with_ffmpeg_bin(mut self, bin: impl Into<String>) -> Self {
        self.ffmpeg_bin = bin.into();
        self
    }

    /// Set the per-conversion deadline
    #[must_use]
    pub fn with_convert_timeout(mut self, timeout: Duration) -> Self {
        self.convert_timeout = timeout;
        self
    }
}
