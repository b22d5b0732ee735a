//! Filelink Messaging Library
//!
//! This crate provides the messaging collaborator abstraction for Filelink: the
//! `Messenger` trait with the five capabilities the relay needs (subscribe, relay,
//! fetch, download, reply), the `MessageConsumer` interface driven by the dispatch
//! loop, and backends for the Telegram Bot API and an in-process conversation store.
//!
//! Connection, authentication and session handling stay inside each backend; the
//! relay only ever talks to `dyn Messenger`.

pub mod consumer;
pub mod factory;
#[cfg(feature = "messenger-memory")]
pub mod memory;
#[cfg(feature = "messenger-telegram")]
pub mod telegram;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use consumer::{run_dispatch_loop, Handled, MessageConsumer};
pub use factory::create_messenger;
pub use filelink_core::MessengerBackend;
#[cfg(feature = "messenger-memory")]
pub use memory::MemoryMessenger;
#[cfg(feature = "messenger-telegram")]
pub use telegram::TelegramMessenger;
pub use traits::{Messenger, MessagingError, MessagingResult};
pub use types::{
    Attachment, AttachmentKind, ByteStream, ChatId, InboundStream, MediaDownload, MediaFile,
    Message, MessageId,
};
