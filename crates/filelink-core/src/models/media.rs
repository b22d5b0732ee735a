use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::num::ParseIntError;
use std::str::FromStr;

use crate::constants::GENERIC_BINARY_MIME;

/// Upstream-assigned identifier of a media object.
///
/// Distinct from the identifier of any message that carries the media: the same
/// object relayed into the storage conversation keeps its `RemoteFileId` while the
/// relayed message gets a fresh message id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteFileId(pub i64);

impl RemoteFileId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for RemoteFileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteFileId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(RemoteFileId)
    }
}

impl From<i64> for RemoteFileId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Media kind enum
///
/// Produced once by classifying an inbound attachment; every later decision
/// (default mime type, synthetic name, whether a player page is offered) switches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Document,
    Video,
    Audio,
    Photo,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Document => "document",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Photo => "photo",
        }
    }

    /// Content type used when the attachment does not declare one.
    pub fn default_mime_type(&self) -> &'static str {
        match self {
            MediaKind::Document => GENERIC_BINARY_MIME,
            MediaKind::Video => "video/mp4",
            MediaKind::Audio => "audio/mpeg",
            MediaKind::Photo => "image/jpeg",
        }
    }

    /// Extension used for synthetic file names.
    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaKind::Document => "bin",
            MediaKind::Video => "mp4",
            MediaKind::Audio => "mp3",
            MediaKind::Photo => "jpg",
        }
    }

    /// Whether a watch link (player page) is offered for this kind.
    pub fn is_playable(&self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::Audio)
    }

    /// Synthetic `{kind}_{YYYYMMDD_HHMMSS}.{ext}` name for attachments without one.
    pub fn synthetic_file_name(&self, at: DateTime<Utc>) -> String {
        format!(
            "{}_{}.{}",
            self.as_str(),
            at.format("%Y%m%d_%H%M%S"),
            self.default_extension()
        )
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "document" => Ok(MediaKind::Document),
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            "photo" => Ok(MediaKind::Photo),
            _ => Err(anyhow::anyhow!("Invalid media kind: {}", s)),
        }
    }
}

/// One successfully ingested file.
///
/// Created once at the end of an ingestion run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub key: String,
    /// Message id inside the storage conversation that holds the media.
    pub remote_location_id: i64,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: Option<u64>,
    pub media_kind: MediaKind,
    pub registered_at: DateTime<Utc>,
}

impl FileRecord {
    /// Content type to serve, never empty.
    pub fn content_type(&self) -> &str {
        if self.mime_type.trim().is_empty() {
            GENERIC_BINARY_MIME
        } else {
            &self.mime_type
        }
    }
}
