//! Conversion request lifecycle: upload, format choice, delivery handle
//!
//! [`Converter`] is the transport-agnostic entry point adapters call into.
//! `handle_upload` stages a fetched file and answers with the formats to
//! offer; `handle_format_choice` transcodes the staged file and hands back
//! a [`Delivery`] whose drop removes both temp files.

use crate::config::CoreConfig;
use crate::error::Result;
use crate::format::{offerable, AudioFormat};
use crate::session::{ConversionRequest, SessionStore};
use crate::staging::StagedFile;
use crate::transcode::Transcoder;
use std::path::Path;
use tracing::info;

/// An inbound audio attachment, already fetched by a transport adapter.
#[derive(Debug, Clone)]
pub struct IncomingAudio {
    /// Raw file bytes
    pub bytes: Vec<u8>,
    /// File name declared by the platform, if any
    pub file_name: Option<String>,
    /// Declared MIME type, if any
    pub mime_type: Option<String>,
}

/// A converted file ready to send, with scoped cleanup.
///
/// Holds both the source and output temp-file guards: dropping the
/// delivery removes both files, whether or not sending succeeded.
#[derive(Debug)]
pub struct Delivery {
    /// Converted output file
    pub output: StagedFile,
    /// Staged source file, held so it is removed together with the output
    pub source: StagedFile,
    /// Name the converted file should be presented under
    pub file_name: String,
    /// Format the file was converted to
    pub target: AudioFormat,
}

/// Transport-agnostic conversion service.
pub struct Converter {
    store: SessionStore,
    transcoder: Transcoder,
    config: CoreConfig,
}

impl Converter {
    /// Create a converter with an empty session store.
    #[must_use]
    pub fn new(config: CoreConfig) -> Self {
        let transcoder = Transcoder::new(config.ffmpeg_bin.clone(), config.convert_timeout);
        Self {
            store: SessionStore::new(),
            transcoder,
            config,
        }
    }

    /// Session store, exposed for eviction and inspection.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Stage a fetched upload for a chat and return the formats to offer.
    ///
    /// A chat that already had a staged file gets it replaced; the
    /// orphaned temp file is removed here.
    pub async fn handle_upload(
        &self,
        chat_id: i64,
        upload: IncomingAudio,
    ) -> Result<Vec<AudioFormat>> {
        let source_format = upload.mime_type.as_deref().and_then(AudioFormat::from_mime);
        let original_name = upload
            .file_name
            .unwrap_or_else(|| fallback_name(source_format));

        let file = StagedFile::create(&self.config.work_dir, &original_name, &upload.bytes).await?;
        info!(
            chat_id,
            file = %file.path().display(),
            source_format = ?source_format,
            size = upload.bytes.len(),
            "Staged upload"
        );

        let request = ConversionRequest {
            file,
            original_name,
            source_format,
        };
        if let Some(previous) = self.store.stage(chat_id, request).await {
            info!(
                chat_id,
                file = %previous.file.path().display(),
                "Replacing previously staged file"
            );
            // previous drops here and takes its temp file with it
        }

        Ok(offerable(source_format))
    }

    /// Convert the staged file for a chat into the chosen target format.
    ///
    /// The staged request is consumed either way: after this call the chat
    /// is back to having nothing staged. With nothing staged to begin
    /// with, fails with the recoverable [`crate::Error::State`].
    pub async fn handle_format_choice(&self, chat_id: i64, target: AudioFormat) -> Result<Delivery> {
        let request = self.store.take(chat_id).await?;

        let output_path = self.transcoder.convert(request.file.path(), target).await?;
        let file_name = delivered_name(&request.original_name, target);
        info!(chat_id, %file_name, target = %target, "Conversion complete");

        Ok(Delivery {
            output: StagedFile::adopt(output_path),
            source: request.file,
            file_name,
            target,
        })
    }
}

/// Name for uploads that declared none (voice notes).
fn fallback_name(source_format: Option<AudioFormat>) -> String {
    let ext = source_format.map_or("ogg", |f| f.extension());
    format!("audio.{ext}")
}

/// User-visible name for the converted file: original stem, target extension.
fn delivered_name(original_name: &str, target: AudioFormat) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    format!("{stem}.{}", target.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::format::CATALOG;

    fn converter(dir: &std::path::Path) -> Converter {
        Converter::new(CoreConfig::default().with_work_dir(dir))
    }

    fn upload(name: Option<&str>, mime: Option<&str>) -> IncomingAudio {
        IncomingAudio {
            bytes: b"not really audio".to_vec(),
            file_name: name.map(str::to_string),
            mime_type: mime.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_upload_offers_catalog_minus_source() {
        let dir = tempfile::tempdir().unwrap();
        let converter = converter(dir.path());

        let offered = converter
            .handle_upload(7, upload(Some("song.mp3"), Some("audio/mpeg")))
            .await
            .unwrap();

        assert_eq!(
            offered,
            vec![AudioFormat::Opus, AudioFormat::Wav, AudioFormat::Aac]
        );
        assert!(converter.store().is_staged(7).await);
    }

    #[tokio::test]
    async fn test_upload_with_unknown_mime_offers_full_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let converter = converter(dir.path());

        let offered = converter
            .handle_upload(7, upload(Some("mystery.bin"), Some("audio/x-unknown")))
            .await
            .unwrap();

        assert_eq!(offered, CATALOG.to_vec());
    }

    #[tokio::test]
    async fn test_upload_writes_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        let converter = converter(dir.path());

        converter
            .handle_upload(7, upload(Some("song.mp3"), Some("audio/mpeg")))
            .await
            .unwrap();

        let staged = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(staged, 1);
    }

    #[tokio::test]
    async fn test_second_upload_replaces_and_cleans_up_first() {
        let dir = tempfile::tempdir().unwrap();
        let converter = converter(dir.path());

        converter
            .handle_upload(7, upload(Some("first.mp3"), Some("audio/mpeg")))
            .await
            .unwrap();
        converter
            .handle_upload(7, upload(Some("second.wav"), Some("audio/wav")))
            .await
            .unwrap();

        // the first temp file is gone, only the replacement remains
        let staged = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(staged, 1);
        assert_eq!(converter.store().len().await, 1);
    }

    #[tokio::test]
    async fn test_format_choice_without_upload_is_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let converter = converter(dir.path());

        let result = converter.handle_format_choice(7, AudioFormat::Wav).await;
        assert!(matches!(result, Err(Error::State)));
        assert!(converter.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_voice_note_gets_fallback_name() {
        let dir = tempfile::tempdir().unwrap();
        let converter = converter(dir.path());

        converter
            .handle_upload(7, upload(None, Some("audio/ogg")))
            .await
            .unwrap();

        let request = converter.store().take(7).await.unwrap();
        assert_eq!(request.original_name, "audio.opus");
        assert_eq!(request.source_format, Some(AudioFormat::Opus));
    }

    #[test]
    fn test_delivered_name_swaps_extension() {
        assert_eq!(delivered_name("song.mp3", AudioFormat::Wav), "song.wav");
        assert_eq!(delivered_name("audio.ogg", AudioFormat::Aac), "audio.aac");
        assert_eq!(delivered_name("noext", AudioFormat::Mp3), "noext.mp3");
    }

    #[tokio::test]
    async fn test_delivery_drop_removes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = StagedFile::create(dir.path(), "in.mp3", b"in").await.unwrap();
        let output = StagedFile::create(dir.path(), "out.wav", b"out").await.unwrap();
        let source_path = source.path().to_path_buf();
        let output_path = output.path().to_path_buf();

        let delivery = Delivery {
            output,
            source,
            file_name: "in.wav".to_string(),
            target: AudioFormat::Wav,
        };
        assert!(source_path.exists());
        assert!(output_path.exists());

        drop(delivery);
        assert!(!source_path.exists());
        assert!(!output_path.exists());
    }
}
