use clap::Args;
use deepscan_core::domain::options::{DEFAULT_BRANCH, GitProjectOptions, ScanOptions};
use std::path::PathBuf;

/// Arguments of `deepscan git`
#[derive(Args, Debug)]
pub struct GitArgs {
    /// Repository of the project to scan
    #[arg(long)]
    pub url: String,

    /// Repository holding the ORT configuration
    #[arg(long)]
    pub config_url: String,

    /// Project branch
    #[arg(long, default_value = DEFAULT_BRANCH)]
    pub branch: String,

    /// Configuration branch
    #[arg(long, default_value = DEFAULT_BRANCH)]
    pub config_branch: String,

    /// Subfolder of the configuration repository to use
    #[arg(long)]
    pub config_folder: Option<String>,

    /// Directory receiving the scan reports
    #[arg(long)]
    pub results_path: Option<PathBuf>,

    /// Enable Windows long path support when it is off
    #[arg(long)]
    pub enable_long_path: bool,
}

impl GitArgs {
    pub fn into_options(self) -> ScanOptions {
        ScanOptions::GitProject(GitProjectOptions {
            project_url: self.url,
            project_config_url: self.config_url,
            project_branch: self.branch,
            project_config_branch: self.config_branch,
            project_config_folder: self.config_folder,
            project_results_path: self.results_path,
            enable_long_path: self.enable_long_path,
        })
    }
}
