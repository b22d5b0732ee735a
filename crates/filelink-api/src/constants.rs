//! API constants

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "filelink=debug,tower_http=debug";

pub const STATUS_ROUTE: &str = "/";
pub const HEALTH_ROUTE: &str = "/health";
pub const FILE_ROUTE: &str = "/file/{key}";
pub const WATCH_ROUTE: &str = "/watch/{key}";

/// Response header carrying the per-request identifier.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
