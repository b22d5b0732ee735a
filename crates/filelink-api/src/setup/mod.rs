//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod messenger;
pub mod routes;
pub mod server;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use filelink_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        base_url = %config.base_url(),
        storage_chat_id = config.storage_chat_id(),
        "Configuration loaded and validated successfully"
    );

    // A messaging backend that cannot connect at startup is fatal
    let messenger = messenger::setup_messenger(&config).await?;

    let state = AppState::new(&config, messenger);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
