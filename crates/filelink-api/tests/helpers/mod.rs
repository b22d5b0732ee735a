//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p filelink-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use bytes::Bytes;
use filelink_api::setup::routes;
use filelink_api::state::AppState;
use filelink_core::{Config, RelayConfig};
use filelink_messaging::{AttachmentKind, ChatId, Handled, MemoryMessenger, Message, MessageConsumer};
use std::collections::HashMap;
use std::sync::Arc;

pub const BASE_URL: &str = "http://files.test";
pub const STORAGE_CHAT: ChatId = ChatId(-100_200_300);
pub const USER_CHAT: ChatId = ChatId(4242);
pub const SENDER: i64 = 77;

/// Test application: server, state and the in-memory messenger behind it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub messenger: MemoryMessenger,
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("BASE_URL", BASE_URL),
        ("STORAGE_CHAT_ID", "-100200300"),
        ("MESSENGER_BACKEND", "memory"),
    ]
    .into_iter()
    .collect();
    let relay = RelayConfig::from_vars(|name| vars.get(name).map(|v| v.to_string()))
        .expect("test config must be valid");
    Config(Box::new(relay))
}

/// Setup test app backed by the in-memory messenger.
pub fn setup_test_app() -> TestApp {
    let config = test_config();
    let messenger = MemoryMessenger::new();
    let state = AppState::new(&config, Arc::new(messenger.clone()));
    let router = routes::setup_routes(&config, state.clone()).expect("routes");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        state,
        messenger,
    }
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Post a file into the user chat without ingesting it.
    pub fn send_file(
        &self,
        kind: AttachmentKind,
        remote_file_id: i64,
        file_name: Option<&str>,
        mime_type: Option<&str>,
        payload: Bytes,
    ) -> Message {
        let file = MemoryMessenger::media_file(
            remote_file_id,
            file_name,
            mime_type,
            Some(payload.len() as u64),
        );
        self.messenger
            .deliver_attachment(USER_CHAT, SENDER, kind, file, payload)
    }

    /// Run the ingestion pipeline on `message`.
    pub async fn ingest(&self, message: Message) -> Handled {
        self.state.ingestion_service().on_message(message).await
    }

    /// Most recent reply text in the user chat.
    pub fn last_reply(&self) -> String {
        self.messenger
            .replies(USER_CHAT)
            .pop()
            .expect("a reply was sent")
    }
}

/// Extract the URL following `label` (e.g. "Download: ") in a reply.
pub fn link_after(reply: &str, label: &str) -> Option<String> {
    reply
        .lines()
        .find_map(|line| line.strip_prefix(label))
        .map(|s| s.trim().to_string())
}

/// Path component of a link under `BASE_URL`.
pub fn path_of(link: &str) -> &str {
    link.strip_prefix(BASE_URL).expect("link under base url")
}
