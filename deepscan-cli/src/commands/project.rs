use clap::Args;
use deepscan_core::domain::options::{ProjectOptions, ScanOptions};
use std::path::PathBuf;

/// Arguments of `deepscan project`
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project directory to scan
    #[arg(long)]
    pub path: PathBuf,

    /// Directory with the ORT configuration
    #[arg(long)]
    pub config_path: PathBuf,

    /// Directory receiving the scan reports
    #[arg(long)]
    pub results_path: Option<PathBuf>,
}

impl ProjectArgs {
    pub fn into_options(self) -> ScanOptions {
        ScanOptions::Project(ProjectOptions {
            project_path: self.path,
            project_config_path: self.config_path,
            project_results_path: self.results_path,
        })
    }
}
