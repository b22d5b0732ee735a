use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Messaging backend types
///
/// Defined in core because configuration selects it before any backend crate is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessengerBackend {
    Telegram,
    Memory,
}

impl FromStr for MessengerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "telegram" => Ok(MessengerBackend::Telegram),
            "memory" => Ok(MessengerBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid messenger backend: {}", s)),
        }
    }
}

impl Display for MessengerBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MessengerBackend::Telegram => write!(f, "telegram"),
            MessengerBackend::Memory => write!(f, "memory"),
        }
    }
}
