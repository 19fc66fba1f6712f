//! Scoped temp files for staged uploads and conversion outputs

use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// A local temp file that is removed when the guard is dropped.
///
/// Both the staged source and the converted output are held through one of
/// these, so every exit path — delivered, failed, or replaced by a newer
/// upload — removes the backing file.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Write `bytes` into `dir` under a uniquified version of `name`.
    ///
    /// The UUID prefix keeps concurrent uploads that share a file name from
    /// colliding on disk.
    pub async fn create(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<Self> {
        let unique = format!("{}-{}", Uuid::new_v4().simple(), sanitize_file_name(name));
        let path = dir.join(unique);
        tokio::fs::write(&path, bytes).await?;
        Ok(Self { path })
    }

    /// Take ownership of a file that already exists on disk.
    #[must_use]
    pub fn adopt(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove temp file");
            }
        }
    }
}

/// Strip path separators and shell-hostile characters from an uploaded name.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
