#[cfg(feature = "messenger-memory")]
use crate::MemoryMessenger;
#[cfg(feature = "messenger-telegram")]
use crate::TelegramMessenger;
use crate::{Messenger, MessagingError, MessagingResult, MessengerBackend};
use filelink_core::Config;
use std::sync::Arc;

/// Create a messaging backend based on configuration
pub async fn create_messenger(config: &Config) -> MessagingResult<Arc<dyn Messenger>> {
    match config.messenger_backend() {
        #[cfg(feature = "messenger-telegram")]
        MessengerBackend::Telegram => {
            let token = config.telegram_bot_token().ok_or_else(|| {
                MessagingError::ConfigError("TELEGRAM_BOT_TOKEN not configured".to_string())
            })?;

            let messenger = TelegramMessenger::new(
                config.telegram_api_url(),
                token,
                config.telegram_poll_timeout_secs(),
            )?;
            Ok(Arc::new(messenger))
        }

        #[cfg(not(feature = "messenger-telegram"))]
        MessengerBackend::Telegram => Err(MessagingError::ConfigError(
            "Telegram backend not available (messenger-telegram feature not enabled)".to_string(),
        )),

        #[cfg(feature = "messenger-memory")]
        MessengerBackend::Memory => Ok(Arc::new(MemoryMessenger::new())),

        #[cfg(not(feature = "messenger-memory"))]
        MessengerBackend::Memory => Err(MessagingError::ConfigError(
            "Memory backend not available (messenger-memory feature not enabled)".to_string(),
        )),
    }
}
