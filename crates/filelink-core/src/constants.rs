/// Fallback content type when neither the attachment nor its kind provides one.
pub const GENERIC_BINARY_MIME: &str = "application/octet-stream";

/// Number of trailing identifier characters used as the visible key prefix.
pub const SHORT_HASH_LEN: usize = 6;

/// Route prefix serving raw bytes.
pub const FILE_ROUTE_PREFIX: &str = "/file";

/// Route prefix serving the player page.
pub const WATCH_ROUTE_PREFIX: &str = "/watch";

/// Service name used in pages and log lines.
pub const SERVICE_NAME: &str = "filelink";
