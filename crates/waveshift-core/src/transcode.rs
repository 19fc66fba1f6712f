//! ffmpeg-backed audio transcoding
//!
//! The container and codec of the source are auto-detected by ffmpeg from
//! file content; the declared MIME type is never trusted for decoding.

use crate::error::{Error, Result};
use crate::format::AudioFormat;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Stderr markers for unreadable input, as opposed to encoder failure.
const DECODE_MARKERS: &[&str] = &[
    "Invalid data found when processing input",
    "could not find codec parameters",
    "moov atom not found",
    "Header missing",
    "Failed to read frame",
];

/// Stderr markers for a missing or broken target encoder.
const ENCODE_MARKERS: &[&str] = &[
    "Unknown encoder",
    "Encoder not found",
    "Automatic encoder selection failed",
];

/// Audio converter shelling out to ffmpeg.
#[derive(Debug, Clone)]
pub struct Transcoder {
    ffmpeg_bin: String,
    timeout: Duration,
}

impl Transcoder {
    /// Create a transcoder invoking `ffmpeg_bin` with a per-conversion deadline.
    #[must_use]
    pub fn new(ffmpeg_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
            timeout,
        }
    }

    /// Output path for `source` re-encoded as `target`: same directory,
    /// extension replaced with the target's.
    #[must_use]
    pub fn output_path_for(source: &Path, target: AudioFormat) -> PathBuf {
        let output = source.with_extension(target.extension());
        if output == source {
            // source already carries the target extension; keep both files
            return source.with_extension(format!("out.{}", target.extension()));
        }
        output
    }

    /// Decode `source` and re-encode it as `target`.
    ///
    /// Writes to the derived output path and returns it. The source file is
    /// left untouched. A run that exceeds the deadline is killed and
    /// reported as an encode failure.
    pub async fn convert(&self, source: &Path, target: AudioFormat) -> Result<PathBuf> {
        let output = Self::output_path_for(source, target);
        debug!(
            source = %source.display(),
            output = %output.display(),
            target = %target,
            "Converting audio"
        );

        let mut cmd = Command::new(&self.ffmpeg_bin);
        cmd.arg("-y")
            .arg("-i")
            .arg(source)
            .arg("-vn")
            .args(target.codec_args())
            .arg("-f")
            .arg(target.muxer())
            .arg(&output);
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            Error::Encode(format!("failed to spawn {}: {}", self.ffmpeg_bin, e))
        })?;

        let run = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                Error::Encode(format!(
                    "{} timed out after {}s",
                    self.ffmpeg_bin,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| Error::Encode(e.to_string()))?;

        if !run.status.success() {
            let stderr = String::from_utf8_lossy(&run.stderr);
            // a failed run can leave a partial output behind
            let _ = std::fs::remove_file(&output);
            return Err(classify_failure(&stderr, run.status.code()));
        }

        debug!(output = %output.display(), "Conversion finished");
        Ok(output)
    }
}

/// Map an ffmpeg failure onto the decode/encode taxonomy from its stderr.
fn classify_failure(stderr: &str, exit_code: Option<i32>) -> Error {
    if DECODE_MARKERS.iter().any(|m| stderr.contains(m)) {
        return Error::Decode(tail(stderr));
    }
    if ENCODE_MARKERS.iter().any(|m| stderr.contains(m)) {
        return Error::Encode(tail(stderr));
    }
    Error::Encode(format!(
        "ffmpeg exited with code {:?}: {}",
        exit_code,
        tail(stderr)
    ))
}

/// Last chunk of stderr, enough to diagnose without logging pages of output.
fn tail(stderr: &str) -> String {
    const MAX: usize = 300;
    let trimmed = stderr.trim_end();
    let total = trimmed.chars().count();
    if total <= MAX {
        trimmed.to_string()
    } else {
        trimmed.chars().skip(total - MAX).collect()
    }
}
