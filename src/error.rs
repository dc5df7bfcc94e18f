//! Infrastructural errors only (spec §7): persistence unreachable at cycle
//! start, missing/invalid configuration. Per-query and per-record outcomes
//! are never errors here — they are `NameserverStatus`/`DsStatus` values
//! recorded on the `Domain`, matching spec §7's framing of DNS/DNSSEC
//! failures as data rather than control flow.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WardenError>;

#[derive(Debug, Error)]
pub enum WardenError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("persistence store unreachable: {0}")]
    Persistence(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
