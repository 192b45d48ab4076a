use clap::Args;
use deepscan_core::domain::options::{PackageOptions, ScanOptions};

/// Arguments of `deepscan package`
#[derive(Args, Debug)]
pub struct PackageArgs {
    /// npm package name
    #[arg(long)]
    pub name: String,

    /// Package version or range
    #[arg(long)]
    pub version: String,

    /// Git repository holding the ORT configuration
    #[arg(long, env = "DEEPSCAN_DEFAULT_CONFIG_REPO")]
    pub config_repo: String,
}

impl PackageArgs {
    pub fn into_options(self) -> ScanOptions {
        ScanOptions::Package(PackageOptions {
            package_name: self.name,
            package_version: self.version,
            ort_config_repo_url: self.config_repo,
        })
    }
}
