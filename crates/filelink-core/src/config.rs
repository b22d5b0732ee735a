//! Configuration module
//!
//! This module provides the static configuration consumed by the relay: where links
//! point, which conversation stores relayed media, and how to reach the messaging
//! backend. Values are read once at startup and never change afterwards.

use std::env;

use crate::messenger_types::MessengerBackend;

// Common constants
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const MAX_POLL_TIMEOUT_SECS: u64 = 50;

/// Base configuration shared by the HTTP surface and the bot
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    /// Public base URL used to compose direct and watch links.
    pub base_url: String,
}

/// Relay configuration
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub base: BaseConfig,
    /// Conversation used as durable blob storage for relayed media.
    pub storage_chat_id: i64,
    pub messenger_backend: MessengerBackend,
    pub telegram_bot_token: Option<String>,
    pub telegram_api_url: String,
    pub telegram_poll_timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<RelayConfig>);

impl Config {
    fn as_relay(&self) -> &RelayConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_relay().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = RelayConfig::from_vars(|name| env::var(name).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_relay().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_relay().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_relay().base.environment
    }

    pub fn base_url(&self) -> &str {
        &self.as_relay().base.base_url
    }

    pub fn storage_chat_id(&self) -> i64 {
        self.as_relay().storage_chat_id
    }

    pub fn messenger_backend(&self) -> MessengerBackend {
        self.as_relay().messenger_backend
    }

    pub fn telegram_bot_token(&self) -> Option<&str> {
        self.as_relay().telegram_bot_token.as_deref()
    }

    pub fn telegram_api_url(&self) -> &str {
        &self.as_relay().telegram_api_url
    }

    pub fn telegram_poll_timeout_secs(&self) -> u64 {
        self.as_relay().telegram_poll_timeout_secs
    }
}

impl RelayConfig {
    /// Build the configuration from a variable lookup (the process environment in
    /// production, a map in tests).
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| var(name).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let environment = non_empty("ENVIRONMENT")
            .or_else(|| non_empty("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match non_empty("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => DEFAULT_PORT,
        };

        let base_url = non_empty("BASE_URL")
            .ok_or_else(|| anyhow::anyhow!("BASE_URL must be set"))?
            .trim_end_matches('/')
            .to_string();

        let storage_chat_id = non_empty("STORAGE_CHAT_ID")
            .ok_or_else(|| anyhow::anyhow!("STORAGE_CHAT_ID must be set"))?
            .parse()
            .map_err(|_| anyhow::anyhow!("STORAGE_CHAT_ID must be a valid chat identifier"))?;

        let telegram_poll_timeout_secs = match non_empty("TELEGRAM_POLL_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse()
                .map_err(|_| anyhow::anyhow!("TELEGRAM_POLL_TIMEOUT_SECS must be a valid number"))?,
            None => DEFAULT_POLL_TIMEOUT_SECS,
        };

        let messenger_backend = match non_empty("MESSENGER_BACKEND") {
            Some(backend) => backend.parse()?,
            None => MessengerBackend::Telegram,
        };

        let config = RelayConfig {
            base: BaseConfig {
                server_port,
                environment,
                base_url,
            },
            storage_chat_id,
            messenger_backend,
            telegram_bot_token: non_empty("TELEGRAM_BOT_TOKEN"),
            telegram_api_url: non_empty("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            telegram_poll_timeout_secs,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.base.base_url.starts_with("http://") || self.base.base_url.starts_with("https://"))
        {
            return Err(anyhow::anyhow!(
                "BASE_URL must be an absolute http:// or https:// URL"
            ));
        }

        if self.telegram_poll_timeout_secs == 0
            || self.telegram_poll_timeout_secs > MAX_POLL_TIMEOUT_SECS
        {
            return Err(anyhow::anyhow!(
                "TELEGRAM_POLL_TIMEOUT_SECS must be between 1 and {}",
                MAX_POLL_TIMEOUT_SECS
            ));
        }

        match self.messenger_backend {
            MessengerBackend::Telegram => {
                if self.telegram_bot_token.is_none() {
                    return Err(anyhow::anyhow!(
                        "TELEGRAM_BOT_TOKEN must be set when using the telegram messenger backend"
                    ));
                }
            }
            MessengerBackend::Memory => {}
        }

        Ok(())
    }
}
