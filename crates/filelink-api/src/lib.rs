//! Filelink API Library
//!
//! This crate provides the HTTP handlers, the ingestion and retrieval services,
//! middleware, and application setup.

// Module declarations
mod handlers;
mod middleware;
mod pages;
mod telemetry;

// Public modules
pub mod constants;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::ingestion::{IngestOutcome, IngestionService};
pub use services::retrieval::{ResolvedFile, RetrievalService};
pub use state::AppState;
