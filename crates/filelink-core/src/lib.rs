//! Filelink Core Library
//!
//! This crate provides the domain models, key codec, file registry, link
//! composition, configuration and error types shared by all Filelink components.

pub mod config;
pub mod constants;
pub mod error;
pub mod keys;
pub mod links;
pub mod messenger_types;
pub mod models;
pub mod registry;

// Re-export commonly used types
pub use config::{BaseConfig, Config, RelayConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use keys::{KeyError, ShortHash};
pub use links::{LinkBuilder, RecordLinks};
pub use messenger_types::MessengerBackend;
pub use models::{FileRecord, MediaKind, RemoteFileId};
pub use registry::{FileRegistry, RegistryError};
