//! Direct and watch link composition.

use crate::constants::{FILE_ROUTE_PREFIX, WATCH_ROUTE_PREFIX};
use crate::keys::{self, KeyError};
use crate::models::FileRecord;

/// Links offered for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLinks {
    pub direct: String,
    /// Only present for playable kinds (audio/video).
    pub watch: Option<String>,
}

/// Builds public URLs under the configured base URL.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL that streams the raw bytes for `key`.
    pub fn direct_link(&self, key: &str) -> String {
        format!("{}{}/{}", self.base_url, FILE_ROUTE_PREFIX, key)
    }

    /// URL of the player page for `key`.
    pub fn watch_link(&self, key: &str) -> String {
        format!("{}{}/{}", self.base_url, WATCH_ROUTE_PREFIX, key)
    }

    /// Direct link rebuilt through the key codec, as embedded by the player page.
    ///
    /// Splitting and re-joining must yield the same key; a key that does not survive
    /// the round trip is rejected instead of producing a link to some other file.
    pub fn reconstructed_direct_link(&self, key: &str) -> Result<String, KeyError> {
        let (hash, id) = keys::split(key)?;
        let rebuilt = keys::join(&hash, id)?;
        if rebuilt != key {
            return Err(KeyError::Malformed(key.to_string()));
        }
        Ok(self.direct_link(&rebuilt))
    }

    pub fn links_for(&self, record: &FileRecord) -> RecordLinks {
        RecordLinks {
            direct: self.direct_link(&record.key),
            watch: record
                .media_kind
                .is_playable()
                .then(|| self.watch_link(&record.key)),
        }
    }
}
