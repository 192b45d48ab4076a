//! Scan configuration
//!
//! Defines where the staging directory lives, where templates are read
//! from, and how long external commands may run.

use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;

/// Default staging directory, relative to the working directory
pub const DEFAULT_WORKSPACE_DIR: &str = "project-scan";

/// Scan engine configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Staging directory holding the container build context
    pub workspace_dir: PathBuf,

    /// Directory with template overrides (built-in templates otherwise)
    pub template_dir: Option<PathBuf>,

    /// Upper bound for short commands (git, docker create/stop/rm, ...)
    pub command_timeout: Duration,

    /// Upper bound for the image build and the scan container run
    pub container_timeout: Duration,

    /// Remove the per-run image once the container is gone
    pub remove_image: bool,
}

impl ScanConfig {
    /// Creates a configuration with defaults for the given staging directory
    pub fn new(workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
            template_dir: None,
            command_timeout: Duration::from_secs(600), // 10 minutes
            container_timeout: Duration::from_secs(7200), // 2 hours
            remove_image: true,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables:
    /// - DEEPSCAN_WORKSPACE_DIR (optional, default: project-scan)
    /// - DEEPSCAN_TEMPLATE_DIR (optional)
    /// - DEEPSCAN_COMMAND_TIMEOUT (optional, seconds, default: 600)
    /// - DEEPSCAN_CONTAINER_TIMEOUT (optional, seconds, default: 7200)
    /// - DEEPSCAN_REMOVE_IMAGE (optional, true/false, default: true)
    pub fn from_env() -> anyhow::Result<Self> {
        let workspace_dir = std::env::var("DEEPSCAN_WORKSPACE_DIR")
            .unwrap_or_else(|_| DEFAULT_WORKSPACE_DIR.to_string());

        let mut config = Self::new(workspace_dir);

        config.template_dir = std::env::var("DEEPSCAN_TEMPLATE_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        if let Ok(value) = std::env::var("DEEPSCAN_COMMAND_TIMEOUT") {
            config.command_timeout = parse_timeout("DEEPSCAN_COMMAND_TIMEOUT", &value)?;
        }

        if let Ok(value) = std::env::var("DEEPSCAN_CONTAINER_TIMEOUT") {
            config.container_timeout = parse_timeout("DEEPSCAN_CONTAINER_TIMEOUT", &value)?;
        }

        if let Ok(value) = std::env::var("DEEPSCAN_REMOVE_IMAGE") {
            config.remove_image = value.parse::<bool>().map_err(|_| {
                anyhow::anyhow!("DEEPSCAN_REMOVE_IMAGE must be true or false, got '{}'", value)
            })?;
        }

        Ok(config)
    }

    /// Sets the template override directory
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workspace_dir.as_os_str().is_empty() {
            anyhow::bail!("workspace_dir cannot be empty");
        }

        if self.command_timeout.is_zero() {
            anyhow::bail!("command_timeout must be greater than 0");
        }

        if self.container_timeout.is_zero() {
            anyhow::bail!("container_timeout must be greater than 0");
        }

        Ok(())
    }
}

/// Parses a timeout given in whole seconds
fn parse_timeout(name: &str, value: &str) -> anyhow::Result<Duration> {
    let seconds = value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{} must be a number of seconds, got '{}'", name, value))?;
    Ok(Duration::from_secs(seconds))
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WORKSPACE_DIR)
    }
}
