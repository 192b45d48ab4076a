//! Server configuration

use anyhow::{Context, Result};
use deepscan_runner::ScanConfig;

/// Configuration repository used when a request does not name one
pub const DEFAULT_CONFIG_REPO: &str = "https://github.com/senthanal/ort-config.git";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,

    /// ORT configuration repository for package scans without one
    pub default_config_repo: String,

    /// Scan engine configuration
    pub scan: ScanConfig,
}

impl ServerConfig {
    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables:
    /// - DEEPSCAN_BIND_ADDR (optional, default: 0.0.0.0:3000)
    /// - DEEPSCAN_DEFAULT_CONFIG_REPO (optional)
    /// - the scan engine variables, see [`ScanConfig::from_env`]
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            std::env::var("DEEPSCAN_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let default_config_repo = std::env::var("DEEPSCAN_DEFAULT_CONFIG_REPO")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_REPO.to_string());

        let scan = ScanConfig::from_env().context("Invalid scan configuration")?;

        Ok(Self {
            bind_addr,
            default_config_repo,
            scan,
        })
    }
}
