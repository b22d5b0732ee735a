//! Backend-neutral message shapes.

use bytes::Bytes;
use filelink_core::RemoteFileId;
use futures::Stream;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::pin::Pin;

use crate::traits::{MessagingError, MessagingResult};

/// Conversation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

impl Display for ChatId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Message identifier, scoped to its conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub i64);

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Attachment shape as reported by the backend, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentKind {
    Document,
    Video,
    Audio,
    Photo,
    Voice,
    Sticker,
    Animation,
    VideoNote,
    Other(String),
}

impl AttachmentKind {
    pub fn name(&self) -> &str {
        match self {
            AttachmentKind::Document => "document",
            AttachmentKind::Video => "video",
            AttachmentKind::Audio => "audio",
            AttachmentKind::Photo => "photo",
            AttachmentKind::Voice => "voice",
            AttachmentKind::Sticker => "sticker",
            AttachmentKind::Animation => "animation",
            AttachmentKind::VideoNote => "video note",
            AttachmentKind::Other(name) => name,
        }
    }
}

/// Media object referenced by a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Numeric identifier of the media object; `None` when the backend could not derive it.
    pub remote_file_id: Option<RemoteFileId>,
    /// Backend handle used to download the payload.
    pub handle: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub file: MediaFile,
}

/// A message in some conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub chat_id: ChatId,
    pub id: MessageId,
    pub sender_id: Option<i64>,
    pub text: Option<String>,
    pub attachment: Option<Attachment>,
}

impl Message {
    pub fn media(&self) -> Option<&MediaFile> {
        self.attachment.as_ref().map(|a| &a.file)
    }
}

/// Stream of payload chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, MessagingError>> + Send>>;

/// Stream of inbound messages.
pub type InboundStream = Pin<Box<dyn Stream<Item = MessagingResult<Message>> + Send>>;

/// A payload being downloaded.
pub struct MediaDownload {
    /// Total size when the backend knows it before streaming.
    pub content_length: Option<u64>,
    pub stream: ByteStream,
}
