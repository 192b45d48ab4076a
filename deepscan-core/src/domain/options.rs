//! Scan option types
//!
//! The scan kind is an explicit tag chosen by the caller. It is never
//! inferred from which fields happen to be populated.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Branch checked out when none is given
pub const DEFAULT_BRANCH: &str = "main";

/// Options for one scan, tagged by scan kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScanOptions {
    Package(PackageOptions),
    Project(ProjectOptions),
    GitProject(GitProjectOptions),
}

/// Scan of a published npm package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageOptions {
    pub package_name: String,
    pub package_version: String,
    pub ort_config_repo_url: String,
}

/// Scan of a project on the local filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOptions {
    pub project_path: PathBuf,
    pub project_config_path: PathBuf,
    #[serde(default)]
    pub project_results_path: Option<PathBuf>,
}

/// Scan of a project hosted in a git repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitProjectOptions {
    pub project_url: String,
    pub project_config_url: String,
    #[serde(default = "default_branch")]
    pub project_branch: String,
    #[serde(default = "default_branch")]
    pub project_config_branch: String,
    #[serde(default)]
    pub project_config_folder: Option<String>,
    #[serde(default)]
    pub project_results_path: Option<PathBuf>,
    #[serde(default)]
    pub enable_long_path: bool,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl GitProjectOptions {
    /// Creates options for the default branches of both repositories
    pub fn new(project_url: impl Into<String>, project_config_url: impl Into<String>) -> Self {
        Self {
            project_url: project_url.into(),
            project_config_url: project_config_url.into(),
            project_branch: default_branch(),
            project_config_branch: default_branch(),
            project_config_folder: None,
            project_results_path: None,
            enable_long_path: false,
        }
    }
}

/// Errors raised by option validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),
}

impl ScanOptions {
    /// Short label of the scan kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ScanOptions::Package(_) => "package",
            ScanOptions::Project(_) => "project",
            ScanOptions::GitProject(_) => "git-project",
        }
    }

    /// Checks that all required fields are populated
    pub fn validate(&self) -> Result<(), OptionsError> {
        match self {
            ScanOptions::Package(opts) => {
                require("packageName", &opts.package_name)?;
                require("packageVersion", &opts.package_version)?;
                require("ortConfigRepoUrl", &opts.ort_config_repo_url)?;
            }
            ScanOptions::Project(opts) => {
                require_path("projectPath", &opts.project_path)?;
                require_path("projectConfigPath", &opts.project_config_path)?;
            }
            ScanOptions::GitProject(opts) => {
                require("projectUrl", &opts.project_url)?;
                require("projectConfigUrl", &opts.project_config_url)?;
                require("projectBranch", &opts.project_branch)?;
                require("projectConfigBranch", &opts.project_config_branch)?;
            }
        }
        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> Result<(), OptionsError> {
    if value.trim().is_empty() {
        return Err(OptionsError::MissingField(field));
    }
    Ok(())
}

fn require_path(field: &'static str, value: &std::path::Path) -> Result<(), OptionsError> {
    if value.as_os_str().is_empty() {
        return Err(OptionsError::MissingField(field));
    }
    Ok(())
}
