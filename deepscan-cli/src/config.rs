//! Configuration module
//!
//! Merges command-line settings into the scan engine configuration.

use anyhow::{Context, Result};
use deepscan_runner::ScanConfig;
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Staging directory, engine default when absent
    pub workspace_dir: Option<PathBuf>,
    /// Template override directory
    pub template_dir: Option<PathBuf>,
    /// Keep the per-run image after the scan
    pub keep_image: bool,
}

impl Config {
    /// Engine configuration from the environment with CLI settings on top
    pub fn scan_config(&self) -> Result<ScanConfig> {
        let mut config = ScanConfig::from_env().context("Invalid scan configuration")?;

        if let Some(dir) = &self.workspace_dir {
            config.workspace_dir = dir.clone();
        }
        if let Some(dir) = &self.template_dir {
            config = config.with_template_dir(dir.clone());
        }
        if self.keep_image {
            config.remove_image = false;
        }

        config.validate()?;
        Ok(config)
    }
}
