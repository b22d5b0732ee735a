use crate::traits::{Messenger, MessagingError, MessagingResult};
use crate::types::{
    Attachment, AttachmentKind, ChatId, InboundStream, MediaDownload, MediaFile, Message,
    MessageId,
};
use crate::MessengerBackend;
use async_trait::async_trait;
use bytes::Bytes;
use filelink_core::RemoteFileId;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

const CHUNK_SIZE: usize = 64 * 1024;

/// In-process messenger holding conversations, payloads and the inbound queue in memory.
///
/// Used by the `memory` backend and by tests; clones share state.
#[derive(Clone)]
pub struct MemoryMessenger {
    inner: Arc<MemoryState>,
}

struct MemoryState {
    chats: Mutex<HashMap<ChatId, BTreeMap<MessageId, Message>>>,
    blobs: Mutex<HashMap<String, Bytes>>,
    sent: Mutex<HashSet<(ChatId, MessageId)>>,
    next_message_id: AtomicI64,
    inbound_tx: mpsc::UnboundedSender<Message>,
    inbound_rx: Mutex<Option<mpsc::UnboundedReceiver<Message>>>,
    fail_relays: AtomicBool,
    fail_downloads: AtomicBool,
    fail_fetches: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryMessenger {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(MemoryState {
                chats: Mutex::new(HashMap::new()),
                blobs: Mutex::new(HashMap::new()),
                sent: Mutex::new(HashSet::new()),
                next_message_id: AtomicI64::new(1),
                inbound_tx,
                inbound_rx: Mutex::new(Some(inbound_rx)),
                fail_relays: AtomicBool::new(false),
                fail_downloads: AtomicBool::new(false),
                fail_fetches: AtomicBool::new(false),
            }),
        }
    }

    /// Build a media descriptor whose download handle is derived from the remote id.
    pub fn media_file(
        remote_file_id: i64,
        file_name: Option<&str>,
        mime_type: Option<&str>,
        file_size: Option<u64>,
    ) -> MediaFile {
        MediaFile {
            remote_file_id: Some(RemoteFileId::new(remote_file_id)),
            handle: format!("mem-{}", remote_file_id),
            file_name: file_name.map(String::from),
            mime_type: mime_type.map(String::from),
            file_size,
        }
    }

    fn next_id(&self) -> MessageId {
        MessageId(self.inner.next_message_id.fetch_add(1, Ordering::SeqCst))
    }

    fn store(&self, message: Message) {
        lock(&self.inner.chats)
            .entry(message.chat_id)
            .or_default()
            .insert(message.id, message);
    }

    fn push_inbound(&self, message: Message) {
        if self.inner.inbound_tx.send(message).is_err() {
            tracing::warn!("Inbound queue closed, message dropped");
        }
    }

    /// Post a text message from `sender_id` and queue it for the subscriber.
    pub fn deliver_text(&self, chat: ChatId, sender_id: i64, text: &str) -> Message {
        let message = Message {
            chat_id: chat,
            id: self.next_id(),
            sender_id: Some(sender_id),
            text: Some(text.to_string()),
            attachment: None,
        };
        self.store(message.clone());
        self.push_inbound(message.clone());
        message
    }

    /// Post a message carrying `file`, store its payload, and queue it for the subscriber.
    pub fn deliver_attachment(
        &self,
        chat: ChatId,
        sender_id: i64,
        kind: AttachmentKind,
        file: MediaFile,
        payload: Bytes,
    ) -> Message {
        self.put_blob(&file.handle, payload);
        let message = Message {
            chat_id: chat,
            id: self.next_id(),
            sender_id: Some(sender_id),
            text: None,
            attachment: Some(Attachment { kind, file }),
        };
        self.store(message.clone());
        self.push_inbound(message.clone());
        message
    }

    pub fn put_blob(&self, handle: &str, payload: Bytes) {
        lock(&self.inner.blobs).insert(handle.to_string(), payload);
    }

    pub fn remove_blob(&self, handle: &str) -> bool {
        lock(&self.inner.blobs).remove(handle).is_some()
    }

    /// Delete a message from a conversation. Returns `false` if it was not there.
    pub fn delete_message(&self, chat: ChatId, id: MessageId) -> bool {
        lock(&self.inner.chats)
            .get_mut(&chat)
            .map(|messages| messages.remove(&id).is_some())
            .unwrap_or(false)
    }

    /// All messages currently held by a conversation, oldest first.
    pub fn messages(&self, chat: ChatId) -> Vec<Message> {
        lock(&self.inner.chats)
            .get(&chat)
            .map(|messages| messages.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Current text of every message this account sent to `chat`, oldest first.
    pub fn replies(&self, chat: ChatId) -> Vec<String> {
        let sent = lock(&self.inner.sent);
        self.messages(chat)
            .into_iter()
            .filter(|m| sent.contains(&(chat, m.id)))
            .filter_map(|m| m.text)
            .collect()
    }

    pub fn set_fail_relays(&self, fail: bool) {
        self.inner.fail_relays.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_downloads(&self, fail: bool) {
        self.inner.fail_downloads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        self.inner.fail_fetches.store(fail, Ordering::SeqCst);
    }
}

impl Default for MemoryMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Messenger for MemoryMessenger {
    async fn verify_connection(&self) -> MessagingResult<String> {
        Ok("memory".to_string())
    }

    async fn subscribe(&self) -> MessagingResult<InboundStream> {
        let rx = lock(&self.inner.inbound_rx).take().ok_or_else(|| {
            MessagingError::ConnectionFailed("inbound queue already subscribed".to_string())
        })?;

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|message| (Ok(message), rx))
        });
        Ok(Box::pin(stream))
    }

    async fn relay(
        &self,
        from_chat: ChatId,
        message_id: MessageId,
        storage_chat: ChatId,
    ) -> MessagingResult<MessageId> {
        if self.inner.fail_relays.load(Ordering::SeqCst) {
            return Err(MessagingError::RequestFailed(
                "relay rejected by memory backend".to_string(),
            ));
        }

        let source = lock(&self.inner.chats)
            .get(&from_chat)
            .and_then(|messages| messages.get(&message_id))
            .cloned()
            .ok_or_else(|| {
                MessagingError::NotFound(format!("message {} in chat {}", message_id, from_chat))
            })?;

        let id = self.next_id();
        self.store(Message {
            chat_id: storage_chat,
            id,
            ..source
        });
        Ok(id)
    }

    async fn fetch_message(
        &self,
        chat: ChatId,
        id: MessageId,
    ) -> MessagingResult<Option<Message>> {
        if self.inner.fail_fetches.load(Ordering::SeqCst) {
            return Err(MessagingError::RequestFailed(
                "fetch rejected by memory backend".to_string(),
            ));
        }
        Ok(lock(&self.inner.chats)
            .get(&chat)
            .and_then(|messages| messages.get(&id))
            .cloned())
    }

    async fn download_media(&self, file: &MediaFile) -> MessagingResult<MediaDownload> {
        if self.inner.fail_downloads.load(Ordering::SeqCst) {
            return Err(MessagingError::DownloadFailed(
                "download rejected by memory backend".to_string(),
            ));
        }

        let payload = lock(&self.inner.blobs)
            .get(&file.handle)
            .cloned()
            .ok_or_else(|| MessagingError::NotFound(format!("payload {}", file.handle)))?;

        let content_length = Some(payload.len() as u64);
        let chunks: Vec<MessagingResult<Bytes>> = (0..payload.len())
            .step_by(CHUNK_SIZE)
            .map(|start| Ok(payload.slice(start..(start + CHUNK_SIZE).min(payload.len()))))
            .collect();

        Ok(MediaDownload {
            content_length,
            stream: Box::pin(futures::stream::iter(chunks)),
        })
    }

    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        _reply_to: Option<MessageId>,
    ) -> MessagingResult<MessageId> {
        let id = self.next_id();
        self.store(Message {
            chat_id: chat,
            id,
            sender_id: None,
            text: Some(text.to_string()),
            attachment: None,
        });
        lock(&self.inner.sent).insert((chat, id));
        Ok(id)
    }

    async fn edit_text(&self, chat: ChatId, id: MessageId, text: &str) -> MessagingResult<()> {
        if !lock(&self.inner.sent).contains(&(chat, id)) {
            return Err(MessagingError::NotFound(format!(
                "sent message {} in chat {}",
                id, chat
            )));
        }

        let mut chats = lock(&self.inner.chats);
        let message = chats
            .get_mut(&chat)
            .and_then(|messages| messages.get_mut(&id))
            .ok_or_else(|| MessagingError::NotFound(format!("message {} in chat {}", id, chat)))?;
        message.text = Some(text.to_string());
        Ok(())
    }

    fn backend_type(&self) -> MessengerBackend {
        MessengerBackend::Memory
    }
}
