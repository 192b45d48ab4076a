//! Commands module
//!
//! Defines the scan subcommands and runs the selected scan.

mod git;
mod package;
mod project;
mod scan;

pub use git::GitArgs;
pub use package::PackageArgs;
pub use project::ProjectArgs;

use anyhow::Result;
use clap::Subcommand;
use deepscan_core::domain::options::ScanOptions;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan a published npm package
    Package(PackageArgs),
    /// Scan a project on the local filesystem
    Project(ProjectArgs),
    /// Scan a project hosted in a git repository
    Git(GitArgs),
}

impl Commands {
    /// Scan options selected by the subcommand
    pub fn into_options(self) -> ScanOptions {
        match self {
            Commands::Package(args) => args.into_options(),
            Commands::Project(args) => args.into_options(),
            Commands::Git(args) => args.into_options(),
        }
    }
}

/// Handle a CLI command
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    scan::run_scan(command.into_options(), config).await
}
