//! Domain models

pub mod media;

pub use media::{FileRecord, MediaKind, RemoteFileId};
