//! Ingestion pipeline
//!
//! Turns an inbound file-bearing message into a registered [`FileRecord`]:
//! classify, relay into the storage conversation, derive the key from the media
//! object's identifier, register, and reply with links. Every failure ends as a
//! chat reply; nothing here propagates out to the dispatch loop.

use async_trait::async_trait;
use chrono::Utc;
use filelink_core::{keys, AppError, FileRecord, FileRegistry, LinkBuilder, MediaKind, RegistryError};
use filelink_messaging::{
    AttachmentKind, ChatId, Handled, Message, MessageConsumer, MessageId, Messenger,
};
use std::sync::Arc;

use super::replies;
use crate::error::log_error;

/// Result of a completed ingestion.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// A new record was registered.
    Registered(Arc<FileRecord>),
    /// The media object was already registered under the same key.
    AlreadyRegistered(Arc<FileRecord>),
}

impl IngestOutcome {
    pub fn record(&self) -> &Arc<FileRecord> {
        match self {
            IngestOutcome::Registered(record) | IngestOutcome::AlreadyRegistered(record) => record,
        }
    }
}

/// Map a backend attachment shape onto a supported media kind.
pub fn classify(kind: &AttachmentKind) -> Result<MediaKind, AppError> {
    match kind {
        AttachmentKind::Document => Ok(MediaKind::Document),
        AttachmentKind::Video => Ok(MediaKind::Video),
        AttachmentKind::Audio => Ok(MediaKind::Audio),
        AttachmentKind::Photo => Ok(MediaKind::Photo),
        other => Err(AppError::UnsupportedMediaKind(other.name().to_string())),
    }
}

/// Whether `text` is the bot command `name`, with or without a `@botname` suffix.
fn is_command(text: &str, name: &str) -> bool {
    text.split_whitespace()
        .next()
        .and_then(|word| word.strip_prefix('/'))
        .map(|word| word.split('@').next().unwrap_or(word))
        .is_some_and(|command| command.eq_ignore_ascii_case(name))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[derive(Clone)]
pub struct IngestionService {
    registry: FileRegistry,
    messenger: Arc<dyn Messenger>,
    links: LinkBuilder,
    storage_chat: ChatId,
}

impl IngestionService {
    pub fn new(
        registry: FileRegistry,
        messenger: Arc<dyn Messenger>,
        links: LinkBuilder,
        storage_chat: ChatId,
    ) -> Self {
        Self {
            registry,
            messenger,
            links,
            storage_chat,
        }
    }

    /// Run the pipeline for one message.
    ///
    /// No record is created unless the relay succeeded. A relayed copy whose key is
    /// already registered is left in the storage conversation.
    #[tracing::instrument(
        skip(self, message),
        fields(chat_id = %message.chat_id, message_id = %message.id)
    )]
    pub async fn ingest(&self, message: &Message) -> Result<IngestOutcome, AppError> {
        let attachment = message
            .attachment
            .as_ref()
            .ok_or_else(|| AppError::InvalidInput("Message has no attachment".to_string()))?;
        let media_kind = classify(&attachment.kind)?;
        let file = &attachment.file;

        let remote_file_id = file.remote_file_id.ok_or_else(|| {
            AppError::InvalidInput("Could not identify this file.".to_string())
        })?;

        let file_name =
            non_empty(&file.file_name).unwrap_or_else(|| media_kind.synthetic_file_name(Utc::now()));
        let mime_type = non_empty(&file.mime_type)
            .unwrap_or_else(|| media_kind.default_mime_type().to_string());

        let relayed = self
            .messenger
            .relay(message.chat_id, message.id, self.storage_chat)
            .await
            .map_err(|e| AppError::RelayFailure(e.to_string()))?;

        let key = keys::generate(remote_file_id);
        let record = FileRecord {
            key,
            remote_location_id: relayed.0,
            file_name,
            mime_type,
            file_size: file.file_size,
            media_kind,
            registered_at: Utc::now(),
        };

        match self.registry.insert(record).await {
            Ok(record) => {
                tracing::info!(
                    key = %record.key,
                    remote_location_id = record.remote_location_id,
                    media_kind = %record.media_kind,
                    file_name = %record.file_name,
                    file_size = ?record.file_size,
                    "File registered"
                );
                Ok(IngestOutcome::Registered(record))
            }
            Err(RegistryError::DuplicateKey { key, existing }) => {
                tracing::warn!(
                    key = %key,
                    existing_location_id = existing.remote_location_id,
                    orphaned_location_id = relayed.0,
                    "Media already registered; relayed copy left unreferenced"
                );
                Ok(IngestOutcome::AlreadyRegistered(existing))
            }
        }
    }

    /// Send a reply, editing the progress message when there is one.
    async fn deliver_reply(
        &self,
        chat: ChatId,
        reply_to: MessageId,
        progress: Option<MessageId>,
        text: &str,
    ) {
        if let Some(progress_id) = progress {
            match self.messenger.edit_text(chat, progress_id, text).await {
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!(error = %e, chat_id = %chat, "Failed to edit progress reply");
                }
            }
        }

        if let Err(e) = self.messenger.send_text(chat, text, Some(reply_to)).await {
            tracing::error!(error = %e, chat_id = %chat, "Failed to send reply");
        }
    }

    async fn handle_text(&self, message: &Message) -> Handled {
        let text = message.text.as_deref().unwrap_or_default();
        if !(is_command(text, "start") || is_command(text, "help")) {
            return Handled::Ignored;
        }

        self.deliver_reply(message.chat_id, message.id, None, replies::USAGE)
            .await;
        Handled::Processed
    }
}

#[async_trait]
impl MessageConsumer for IngestionService {
    async fn on_message(&self, message: Message) -> Handled {
        let Some(attachment) = message.attachment.as_ref() else {
            return self.handle_text(&message).await;
        };

        // Unsupported kinds are rejected without a progress reply.
        let progress = if classify(&attachment.kind).is_ok() {
            match self
                .messenger
                .send_text(message.chat_id, replies::PROCESSING, Some(message.id))
                .await
            {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(error = %e, chat_id = %message.chat_id, "Failed to send progress reply");
                    None
                }
            }
        } else {
            None
        };

        let text = match self.ingest(&message).await {
            Ok(IngestOutcome::Registered(record)) => replies::stored(&record, &self.links),
            Ok(IngestOutcome::AlreadyRegistered(record)) => {
                replies::already_stored(&record, &self.links)
            }
            Err(e) => {
                log_error(&e);
                replies::failure(&e)
            }
        };

        self.deliver_reply(message.chat_id, message.id, progress, &text)
            .await;
        Handled::Processed
    }
}
