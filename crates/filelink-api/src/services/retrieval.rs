//! Retrieval pipeline
//!
//! Re-resolves a key to live bytes on every request: registry lookup, fetch of the
//! relayed message from the storage conversation, then a streamed download of its
//! media. Nothing is cached.

use filelink_core::{AppError, FileRecord, FileRegistry};
use filelink_messaging::{ChatId, MediaDownload, MessageId, Messenger, MessagingError};
use std::sync::Arc;

const NOT_FOUND_MESSAGE: &str = "File not found";

/// A record together with its payload stream.
pub struct ResolvedFile {
    pub record: Arc<FileRecord>,
    pub download: MediaDownload,
}

/// Upstream misses are 404s; every other messaging error is an upstream failure.
fn upstream_error(err: MessagingError) -> AppError {
    match err {
        MessagingError::NotFound(detail) => {
            tracing::debug!(detail = %detail, "Upstream object missing");
            AppError::NotFound(NOT_FOUND_MESSAGE.to_string())
        }
        other => AppError::UpstreamFailure(other.to_string()),
    }
}

#[derive(Clone)]
pub struct RetrievalService {
    registry: FileRegistry,
    messenger: Arc<dyn Messenger>,
    storage_chat: ChatId,
}

impl RetrievalService {
    pub fn new(registry: FileRegistry, messenger: Arc<dyn Messenger>, storage_chat: ChatId) -> Self {
        Self {
            registry,
            messenger,
            storage_chat,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, key: &str) -> Result<ResolvedFile, AppError> {
        let record = self
            .registry
            .lookup(key)
            .await
            .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

        let message = self
            .messenger
            .fetch_message(self.storage_chat, MessageId(record.remote_location_id))
            .await
            .map_err(upstream_error)?
            .ok_or_else(|| {
                tracing::warn!(
                    key = %record.key,
                    remote_location_id = record.remote_location_id,
                    "Stored message no longer exists"
                );
                AppError::NotFound(NOT_FOUND_MESSAGE.to_string())
            })?;

        let media = message.media().ok_or_else(|| {
            tracing::warn!(
                key = %record.key,
                remote_location_id = record.remote_location_id,
                "Stored message carries no media"
            );
            AppError::NotFound(NOT_FOUND_MESSAGE.to_string())
        })?;

        let download = self
            .messenger
            .download_media(media)
            .await
            .map_err(upstream_error)?;

        tracing::debug!(
            key = %record.key,
            content_length = ?download.content_length,
            "Streaming stored file"
        );

        Ok(ResolvedFile { record, download })
    }
}
