//! Messaging backend setup and inbound dispatch

use crate::state::AppState;
use anyhow::{Context, Result};
use filelink_core::Config;
use filelink_messaging::{create_messenger, run_dispatch_loop, Messenger};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Create the configured messaging backend and verify it can connect.
pub async fn setup_messenger(config: &Config) -> Result<Arc<dyn Messenger>> {
    let messenger = create_messenger(config)
        .await
        .context("Failed to create messaging backend")?;

    let account = messenger
        .verify_connection()
        .await
        .context("Failed to connect to messaging backend")?;

    tracing::info!(
        backend = %messenger.backend_type(),
        account = %account,
        "Messaging backend connected"
    );

    Ok(messenger)
}

/// Spawn the dispatch loop feeding inbound messages to the ingestion pipeline.
pub fn spawn_dispatcher(state: &Arc<AppState>, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    let consumer = Arc::new(state.ingestion_service());
    tokio::spawn(run_dispatch_loop(state.messenger.clone(), consumer, shutdown))
}
