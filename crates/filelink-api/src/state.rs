//! Application state shared by the HTTP handlers and the inbound dispatcher.

use crate::services::ingestion::IngestionService;
use crate::services::retrieval::RetrievalService;
use filelink_core::{Config, FileRegistry, LinkBuilder};
use filelink_messaging::{ChatId, Messenger};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub registry: FileRegistry,
    pub messenger: Arc<dyn Messenger>,
    pub links: LinkBuilder,
    pub storage_chat: ChatId,
    pub retrieval: RetrievalService,
    pub started_at: Instant,
}

impl AppState {
    /// Build the state with a fresh, empty registry.
    pub fn new(config: &Config, messenger: Arc<dyn Messenger>) -> Arc<Self> {
        let registry = FileRegistry::new();
        let storage_chat = ChatId(config.storage_chat_id());
        let links = LinkBuilder::new(config.base_url());
        let retrieval = RetrievalService::new(registry.clone(), messenger.clone(), storage_chat);

        Arc::new(Self {
            registry,
            messenger,
            links,
            storage_chat,
            retrieval,
            started_at: Instant::now(),
        })
    }

    /// Ingestion pipeline writing into this state's registry.
    pub fn ingestion_service(&self) -> IngestionService {
        IngestionService::new(
            self.registry.clone(),
            self.messenger.clone(),
            self.links.clone(),
            self.storage_chat,
        )
    }
}
