//! Per-chat session state bridging upload and format choice

use crate::error::{Error, Result};
use crate::format::AudioFormat;
use crate::staging::StagedFile;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A staged upload awaiting its format choice.
#[derive(Debug)]
pub struct ConversionRequest {
    /// Scoped handle on the downloaded source file
    pub file: StagedFile,
    /// File name the upload was declared under
    pub original_name: String,
    /// Source format recognized from the declared MIME type
    pub source_format: Option<AudioFormat>,
}

/// Session store keyed by chat id.
///
/// Each chat holds at most one staged request; staging a new one replaces
/// (and thereby cleans up) the previous one. Entries never expire on their
/// own — [`SessionStore::evict`] removes one explicitly. Injected into
/// handlers rather than held as process-global state.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: RwLock<HashMap<i64, ConversionRequest>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a request for a chat, returning the request it replaced.
    ///
    /// Dropping the returned request removes its orphaned backing file.
    pub async fn stage(
        &self,
        chat_id: i64,
        request: ConversionRequest,
    ) -> Option<ConversionRequest> {
        self.entries.write().await.insert(chat_id, request)
    }

    /// Remove and return the staged request for a chat.
    ///
    /// A chat with nothing staged is a [`Error::State`] — the caller turns
    /// that into a re-upload prompt.
    pub async fn take(&self, chat_id: i64) -> Result<ConversionRequest> {
        self.entries.write().await.remove(&chat_id).ok_or(Error::State)
    }

    /// Whether a chat currently has a staged request.
    pub async fn is_staged(&self, chat_id: i64) -> bool {
        self.entries.read().await.contains_key(&chat_id)
    }

    /// Drop a chat's staged request and its backing file, if any.
    pub async fn evict(&self, chat_id: i64) -> bool {
        self.entries.write().await.remove(&chat_id).is_some()
    }

    /// Number of chats with a staged request.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no chat has a staged request.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
