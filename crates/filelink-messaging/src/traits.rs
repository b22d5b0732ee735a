//! Messaging abstraction trait
//!
//! This module defines the Messenger trait that all messaging backends must implement.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{ChatId, InboundStream, MediaDownload, MediaFile, MessageId, Message};
use crate::MessengerBackend;

/// Messaging operation errors
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("API error {code}: {description}")]
    Api { code: i32, description: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for messaging operations
pub type MessagingResult<T> = Result<T, MessagingError>;

/// Messaging abstraction trait
///
/// The relay needs exactly these capabilities from the messaging client; everything
/// else (authentication, reconnects, session storage) belongs to the backend.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Check that the backend is reachable and authenticated.
    ///
    /// Returns a display name for the connected account.
    async fn verify_connection(&self) -> MessagingResult<String>;

    /// Subscribe to inbound messages.
    ///
    /// Only one subscription is expected per process.
    async fn subscribe(&self) -> MessagingResult<InboundStream>;

    /// Relay an existing message into `storage_chat`, returning the id of the new copy.
    async fn relay(
        &self,
        from_chat: ChatId,
        message_id: MessageId,
        storage_chat: ChatId,
    ) -> MessagingResult<MessageId>;

    /// Fetch a message by id; `Ok(None)` when the conversation no longer holds it.
    async fn fetch_message(&self, chat: ChatId, id: MessageId)
        -> MessagingResult<Option<Message>>;

    /// Download the payload referenced by a message's media.
    async fn download_media(&self, file: &MediaFile) -> MessagingResult<MediaDownload>;

    /// Send a text message, optionally as a reply.
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> MessagingResult<MessageId>;

    /// Replace the text of a message previously sent by this account.
    async fn edit_text(&self, chat: ChatId, id: MessageId, text: &str) -> MessagingResult<()>;

    /// Get the messaging backend type
    fn backend_type(&self) -> MessengerBackend;
}
