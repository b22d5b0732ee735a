//! Startup configuration checks beyond parsing

use anyhow::Result;
use filelink_core::{Config, MessengerBackend};

/// Validate configuration before anything is started.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.storage_chat_id() == 0 {
        return Err(anyhow::anyhow!("STORAGE_CHAT_ID must not be 0"));
    }

    if config.is_production() {
        if config.base_url().starts_with("http://") {
            tracing::warn!(
                base_url = %config.base_url(),
                "BASE_URL is not HTTPS in production"
            );
        }
        if config.messenger_backend() == MessengerBackend::Memory {
            tracing::warn!(
                "In-memory messenger selected in production - no inbound messages will arrive"
            );
        }
    }

    Ok(())
}
