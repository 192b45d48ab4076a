//! Deepscan CLI
//!
//! Runs license compliance scans of npm packages, local projects and git
//! projects from the command line, with live progress on the terminal.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "deepscan")]
#[command(about = "License compliance deep scan powered by ORT", long_about = None)]
struct Cli {
    /// Staging directory for the container build context
    #[arg(long, env = "DEEPSCAN_WORKSPACE_DIR")]
    workspace_dir: Option<PathBuf>,

    /// Directory with template overrides
    #[arg(long, env = "DEEPSCAN_TEMPLATE_DIR")]
    template_dir: Option<PathBuf>,

    /// Keep the scan image after the run
    #[arg(long)]
    keep_image: bool,

    /// Print diagnostics of every command run
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr below the spinners, quiet unless asked for
    let default_filter = if cli.verbose {
        "deepscan_runner=debug,deepscan=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config {
        workspace_dir: cli.workspace_dir,
        template_dir: cli.template_dir,
        keep_image: cli.keep_image,
    };

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepscan_core::domain::options::ScanOptions;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("deepscan").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_package_arguments() {
        let cli = parse(&[
            "package",
            "--name",
            "left-pad",
            "--version",
            "1.3.0",
            "--config-repo",
            "https://example.com/cfg.git",
        ]);

        match cli.command.into_options() {
            ScanOptions::Package(opts) => {
                assert_eq!(opts.package_name, "left-pad");
                assert_eq!(opts.package_version, "1.3.0");
                assert_eq!(opts.ort_config_repo_url, "https://example.com/cfg.git");
            }
            other => panic!("unexpected options: {:?}", other),
        }
    }

    #[test]
    fn test_project_arguments() {
        let cli = parse(&[
            "--keep-image",
            "project",
            "--path",
            "./app",
            "--config-path",
            "./ort-config",
            "--results-path",
            "./results",
        ]);
        assert!(cli.keep_image);

        match cli.command.into_options() {
            ScanOptions::Project(opts) => {
                assert_eq!(opts.project_path, PathBuf::from("./app"));
                assert_eq!(opts.project_config_path, PathBuf::from("./ort-config"));
                assert_eq!(opts.project_results_path, Some(PathBuf::from("./results")));
            }
            other => panic!("unexpected options: {:?}", other),
        }
    }

    #[test]
    fn test_git_arguments_defaults() {
        let cli = parse(&[
            "git",
            "--url",
            "https://example.com/app.git",
            "--config-url",
            "https://example.com/cfg.git",
        ]);

        match cli.command.into_options() {
            ScanOptions::GitProject(opts) => {
                assert_eq!(opts.project_branch, "main");
                assert_eq!(opts.project_config_branch, "main");
                assert_eq!(opts.project_config_folder, None);
                assert!(!opts.enable_long_path);
            }
            other => panic!("unexpected options: {:?}", other),
        }
    }

    #[test]
    fn test_git_arguments_full() {
        let cli = parse(&[
            "git",
            "--url",
            "https://example.com/app.git",
            "--config-url",
            "https://example.com/cfg.git",
            "--branch",
            "develop",
            "--config-branch",
            "release",
            "--config-folder",
            "policies/strict",
            "--results-path",
            "out",
            "--enable-long-path",
        ]);

        match cli.command.into_options() {
            ScanOptions::GitProject(opts) => {
                assert_eq!(opts.project_branch, "develop");
                assert_eq!(opts.project_config_branch, "release");
                assert_eq!(opts.project_config_folder.as_deref(), Some("policies/strict"));
                assert_eq!(opts.project_results_path, Some(PathBuf::from("out")));
                assert!(opts.enable_long_path);
            }
            other => panic!("unexpected options: {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_argument() {
        let result = Cli::try_parse_from(["deepscan", "package", "--name", "left-pad"]);
        assert!(result.is_err());
    }
}
