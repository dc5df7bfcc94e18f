//! Configuration loading (spec §6 "Configuration (recognized options...)").
//! `toml` + `serde` deserialization into `Config`, mirroring the teacher
//! crate's `DnsConfig` load path; `serde(default)` throughout provides the
//! defaults spec.md names.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WardenError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub http: HttpConfig,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scan: ScanConfig::default(),
            http: HttpConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(WardenError::from)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&contents)
    }
}

/// The "Scan.*" options spec.md §6 names, with exactly the defaults it
/// documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub number_of_queriers: usize,
    pub domains_buffer_size: usize,
    pub udp_max_size: u16,
    pub dial_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    pub max_ok_verification_days: i64,
    pub max_error_verification_days: i64,
    pub max_expiration_alert_days: i64,
    /// DNS port, configurable for tests (design note, spec §9: "a mutable
    /// process-wide DNS port ... is a known anti-pattern"; threaded through
    /// config/transport construction instead of a global).
    pub dns_port: u16,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            number_of_queriers: 5,
            domains_buffer_size: 100,
            udp_max_size: 4096,
            dial_timeout_secs: 3,
            read_timeout_secs: 3,
            write_timeout_secs: 3,
            max_ok_verification_days: 30,
            max_error_verification_days: 7,
            max_expiration_alert_days: 7,
            dns_port: 53,
        }
    }
}

impl ScanConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub bind_addr: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            enabled: true,
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.scan.number_of_queriers, 5);
        assert_eq!(config.scan.domains_buffer_size, 100);
        assert_eq!(config.scan.udp_max_size, 4096);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config = Config::from_toml_str(
            r#"
            [scan]
            number_of_queriers = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.scan.number_of_queriers, 10);
        assert_eq!(config.scan.domains_buffer_size, 100);
    }
}
