//! Bot API wire types.

use serde::Deserialize;

use super::file_id::decode_media_id;
use crate::types::{Attachment, AttachmentKind, ChatId, MediaFile, Message, MessageId};

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TgUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: String,
}

#[derive(Debug, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

/// Any file-bearing object; the Bot API shapes share these fields.
#[derive(Debug, Clone, Deserialize)]
pub struct TgFile {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct TgFilePath {
    pub file_path: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub chat: TgChat,
    pub from: Option<TgUser>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub document: Option<TgFile>,
    pub video: Option<TgFile>,
    pub audio: Option<TgFile>,
    pub photo: Option<Vec<TgFile>>,
    pub voice: Option<TgFile>,
    pub sticker: Option<TgFile>,
    pub animation: Option<TgFile>,
    pub video_note: Option<TgFile>,
}

impl TgMessage {
    fn attachment(&self) -> Option<(AttachmentKind, TgFile)> {
        // Animations also carry a `document` field, so they are checked first.
        if let Some(f) = &self.animation {
            return Some((AttachmentKind::Animation, f.clone()));
        }
        let largest_photo = self.photo.as_ref().and_then(|sizes| {
            sizes
                .iter()
                .enumerate()
                .max_by_key(|(i, size)| (size.file_size.unwrap_or(0), *i))
                .map(|(_, size)| size.clone())
        });

        [
            (AttachmentKind::Document, self.document.clone()),
            (AttachmentKind::Video, self.video.clone()),
            (AttachmentKind::Audio, self.audio.clone()),
            (AttachmentKind::Photo, largest_photo),
            (AttachmentKind::Voice, self.voice.clone()),
            (AttachmentKind::Sticker, self.sticker.clone()),
            (AttachmentKind::VideoNote, self.video_note.clone()),
        ]
        .into_iter()
        .find_map(|(kind, file)| file.map(|f| (kind, f)))
    }

    pub fn into_message(self) -> Message {
        let attachment = self.attachment().map(|(kind, file)| {
            let remote_file_id = match decode_media_id(&file.file_id) {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        message_id = self.message_id,
                        "Could not derive remote file id from file_id"
                    );
                    None
                }
            };
            Attachment {
                kind,
                file: MediaFile {
                    remote_file_id,
                    handle: file.file_id,
                    file_name: file.file_name,
                    mime_type: file.mime_type,
                    file_size: file.file_size,
                },
            }
        });

        Message {
            chat_id: ChatId(self.chat.id),
            id: MessageId(self.message_id),
            sender_id: self.from.map(|u| u.id),
            text: self.text.or(self.caption),
            attachment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message_has_no_attachment() {
        let raw = r#"{"message_id": 5, "chat": {"id": 11}, "from": {"id": 3, "first_name": "a"}, "text": "/start"}"#;
        let message: TgMessage = serde_json::from_str(raw).unwrap();
        let message = message.into_message();
        assert_eq!(message.id, MessageId(5));
        assert_eq!(message.chat_id, ChatId(11));
        assert_eq!(message.sender_id, Some(3));
        assert_eq!(message.text.as_deref(), Some("/start"));
        assert!(message.attachment.is_none());
    }

    #[test]
    fn test_animation_wins_over_document() {
        let raw = r#"{"message_id": 1, "chat": {"id": 1},
            "animation": {"file_id": "anim", "file_unique_id": "u"},
            "document": {"file_id": "anim", "file_unique_id": "u"}}"#;
        let message: TgMessage = serde_json::from_str(raw).unwrap();
        let message = message.into_message();
        let attachment = message.attachment.unwrap();
        assert_eq!(attachment.kind, AttachmentKind::Animation);
        assert_eq!(attachment.file.remote_file_id, None);
    }

    #[test]
    fn test_largest_photo_is_selected() {
        let raw = r#"{"message_id": 1, "chat": {"id": 1}, "photo": [
            {"file_id": "small", "file_size": 100, "width": 90, "height": 90},
            {"file_id": "large", "file_size": 9000, "width": 800, "height": 800},
            {"file_id": "medium", "file_size": 1000, "width": 320, "height": 320}]}"#;
        let message: TgMessage = serde_json::from_str(raw).unwrap();
        let attachment = message.into_message().attachment.unwrap();
        assert_eq!(attachment.kind, AttachmentKind::Photo);
        assert_eq!(attachment.file.handle, "large");
    }

    #[test]
    fn test_error_response_shape() {
        let raw = r#"{"ok": false, "error_code": 400, "description": "Bad Request: message to forward not found"}"#;
        let response: ApiResponse<TgMessage> = serde_json::from_str(raw).unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.error_code, Some(400));
    }
}
