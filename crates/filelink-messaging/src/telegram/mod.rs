//! Telegram Bot API messenger.
//!
//! Inbound messages come from `getUpdates` long polling. The Bot API has no call for
//! reading an arbitrary message, so `fetch_message` forwards the message into its own
//! chat, reads the copy, and deletes it again.

mod api;
pub mod file_id;

use crate::traits::{Messenger, MessagingError, MessagingResult};
use crate::types::{ChatId, InboundStream, MediaDownload, MediaFile, Message, MessageId};
use crate::MessengerBackend;
use api::{ApiResponse, TgFilePath, TgMessage, TgUser, Update};
use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::VecDeque;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Messenger backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramMessenger {
    client: reqwest::Client,
    api_url: String,
    token: String,
    poll_timeout_secs: u64,
}

struct PollState {
    messenger: TelegramMessenger,
    offset: i64,
    pending: VecDeque<Message>,
}

/// Whether a Bot API error description means the referenced message is gone.
fn is_missing_message(description: &str) -> bool {
    let lower = description.to_ascii_lowercase();
    lower.contains("message to forward not found")
        || lower.contains("message to delete not found")
        || lower.contains("message not found")
        || lower.contains("message_id_invalid")
}

impl TelegramMessenger {
    /// Create a new TelegramMessenger
    ///
    /// # Arguments
    /// * `api_url` - Bot API root (e.g., "https://api.telegram.org")
    /// * `token` - Bot token issued by BotFather
    /// * `poll_timeout_secs` - Long-poll timeout passed to `getUpdates`
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        poll_timeout_secs: u64,
    ) -> MessagingResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(MessagingError::ConfigError(
                "Telegram bot token is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| MessagingError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
            poll_timeout_secs,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_url, self.token, file_path)
    }

    /// Invoke a Bot API method. Transport errors never include the URL, which carries the token.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
        timeout: Duration,
    ) -> MessagingResult<T> {
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(&params)
            .send()
            .await
            .map_err(|e| MessagingError::RequestFailed(format!("{}: {}", method, e.without_url())))?;

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| MessagingError::Decode(format!("{}: {}", method, e.without_url())))?;

        if body.ok {
            return body.result.ok_or_else(|| {
                MessagingError::Decode(format!("{}: response without result", method))
            });
        }

        let description = body.description.unwrap_or_default();
        if is_missing_message(&description) {
            return Err(MessagingError::NotFound(description));
        }
        Err(MessagingError::Api {
            code: body.error_code.unwrap_or_default(),
            description,
        })
    }

    async fn get_updates(&self, offset: i64) -> MessagingResult<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": self.poll_timeout_secs,
                "allowed_updates": ["message"],
            }),
            Duration::from_secs(self.poll_timeout_secs) + REQUEST_TIMEOUT,
        )
        .await
    }

    async fn delete_message(&self, chat: ChatId, id: MessageId) -> MessagingResult<()> {
        let _: bool = self
            .call(
                "deleteMessage",
                json!({ "chat_id": chat.0, "message_id": id.0 }),
                REQUEST_TIMEOUT,
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn verify_connection(&self) -> MessagingResult<String> {
        let me: TgUser = self
            .call("getMe", json!({}), REQUEST_TIMEOUT)
            .await
            .map_err(|e| MessagingError::ConnectionFailed(e.to_string()))?;

        let name = me
            .username
            .map(|u| format!("@{}", u))
            .unwrap_or(me.first_name);
        tracing::info!(bot_id = me.id, bot = %name, "Telegram bot authenticated");
        Ok(name)
    }

    async fn subscribe(&self) -> MessagingResult<InboundStream> {
        let state = PollState {
            messenger: self.clone(),
            offset: 0,
            pending: VecDeque::new(),
        };

        let stream = futures::stream::unfold(state, |mut state| async move {
            loop {
                if let Some(message) = state.pending.pop_front() {
                    return Some((Ok(message), state));
                }

                match state.messenger.get_updates(state.offset).await {
                    Ok(updates) => {
                        for update in updates {
                            state.offset = state.offset.max(update.update_id + 1);
                            if let Some(message) = update.message {
                                state.pending.push_back(message.into_message());
                            }
                        }
                    }
                    Err(e) => return Some((Err(e), state)),
                }
            }
        });

        Ok(Box::pin(stream))
    }

    async fn relay(
        &self,
        from_chat: ChatId,
        message_id: MessageId,
        storage_chat: ChatId,
    ) -> MessagingResult<MessageId> {
        let relayed: TgMessage = self
            .call(
                "forwardMessage",
                json!({
                    "chat_id": storage_chat.0,
                    "from_chat_id": from_chat.0,
                    "message_id": message_id.0,
                    "disable_notification": true,
                }),
                REQUEST_TIMEOUT,
            )
            .await?;

        Ok(MessageId(relayed.message_id))
    }

    async fn fetch_message(
        &self,
        chat: ChatId,
        id: MessageId,
    ) -> MessagingResult<Option<Message>> {
        let probe: TgMessage = match self
            .call(
                "forwardMessage",
                json!({
                    "chat_id": chat.0,
                    "from_chat_id": chat.0,
                    "message_id": id.0,
                    "disable_notification": true,
                }),
                REQUEST_TIMEOUT,
            )
            .await
        {
            Ok(probe) => probe,
            Err(MessagingError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let probe_id = MessageId(probe.message_id);
        if let Err(e) = self.delete_message(chat, probe_id).await {
            tracing::warn!(
                error = %e,
                chat_id = %chat,
                probe_id = %probe_id,
                "Failed to delete probe copy"
            );
        }

        let message = probe.into_message();
        Ok(Some(Message {
            chat_id: chat,
            id,
            ..message
        }))
    }

    async fn download_media(&self, file: &MediaFile) -> MessagingResult<MediaDownload> {
        let info: TgFilePath = self
            .call(
                "getFile",
                json!({ "file_id": file.handle }),
                REQUEST_TIMEOUT,
            )
            .await
            .map_err(|e| match e {
                MessagingError::Api { code, description } => MessagingError::DownloadFailed(
                    format!("getFile {}: {}", code, description),
                ),
                other => other,
            })?;

        let file_path = info.file_path.ok_or_else(|| {
            MessagingError::NotFound(format!("no file path for handle {}", file.handle))
        })?;

        let response = self
            .client
            .get(self.file_url(&file_path))
            .send()
            .await
            .map_err(|e| MessagingError::DownloadFailed(e.without_url().to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MessagingError::NotFound(format!("file {}", file_path)));
        }
        if !status.is_success() {
            return Err(MessagingError::DownloadFailed(format!(
                "file download returned {}",
                status
            )));
        }

        let content_length = response
            .content_length()
            .or(info.file_size)
            .or(file.file_size);
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| MessagingError::DownloadFailed(e.without_url().to_string())));

        Ok(MediaDownload {
            content_length,
            stream: Box::pin(stream),
        })
    }

    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> MessagingResult<MessageId> {
        let mut params = json!({
            "chat_id": chat.0,
            "text": text,
            "disable_web_page_preview": true,
        });
        if let Some(reply_to) = reply_to {
            params["reply_to_message_id"] = json!(reply_to.0);
            params["allow_sending_without_reply"] = json!(true);
        }

        let sent: TgMessage = self.call("sendMessage", params, REQUEST_TIMEOUT).await?;
        Ok(MessageId(sent.message_id))
    }

    async fn edit_text(&self, chat: ChatId, id: MessageId, text: &str) -> MessagingResult<()> {
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                json!({
                    "chat_id": chat.0,
                    "message_id": id.0,
                    "text": text,
                    "disable_web_page_preview": true,
                }),
                REQUEST_TIMEOUT,
            )
            .await?;
        Ok(())
    }

    fn backend_type(&self) -> MessengerBackend {
        MessengerBackend::Telegram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_rejected() {
        let result = TelegramMessenger::new("https://api.telegram.org", "  ", 30);
        assert!(matches!(result, Err(MessagingError::ConfigError(_))));
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let messenger = TelegramMessenger::new("http://localhost:8081/", "123:abc", 30).unwrap();
        assert_eq!(
            messenger.method_url("getMe"),
            "http://localhost:8081/bot123:abc/getMe"
        );
        assert_eq!(
            messenger.file_url("documents/file_1.pdf"),
            "http://localhost:8081/file/bot123:abc/documents/file_1.pdf"
        );
    }

    #[test]
    fn test_missing_message_detection() {
        assert!(is_missing_message("Bad Request: message to forward not found"));
        assert!(is_missing_message("Bad Request: MESSAGE_ID_INVALID"));
        assert!(!is_missing_message("Too Many Requests: retry after 5"));
    }
}
