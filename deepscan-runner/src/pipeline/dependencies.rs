//! Host prerequisite checks

use tracing::{debug, info};

use super::context::ScanContext;
use crate::process::CommandLine;

/// Registry key holding the Windows long path switch
const FILESYSTEM_KEY: &str = r"HKLM\SYSTEM\CurrentControlSet\Control\FileSystem";
const LONG_PATHS_VALUE: &str = "LongPathsEnabled";

/// A tool the scan needs, probed by running a harmless command
struct Requirement {
    description: &'static str,
    probe: CommandLine,
}

fn requirements() -> Vec<Requirement> {
    vec![
        Requirement {
            description: "git is not installed",
            probe: CommandLine::new("git").arg("--version"),
        },
        Requirement {
            description: "docker is not installed",
            probe: CommandLine::new("docker").arg("--version"),
        },
        Requirement {
            description: "docker is not running",
            probe: CommandLine::new("docker").arg("info"),
        },
    ]
}

/// Probes git, docker and the docker daemon
///
/// Only the exit status counts here: `docker info` routinely prints
/// warnings on stderr.
pub async fn check_tools(ctx: &ScanContext) -> Vec<String> {
    let mut missing = Vec::new();

    for requirement in requirements() {
        let output = ctx.run(&requirement.probe).await;
        if output.success() {
            debug!("{} -> {}", requirement.probe, output.stdout.lines().next().unwrap_or_default());
        } else {
            info!("Prerequisite check '{}' failed", requirement.probe);
            missing.push(requirement.description.to_string());
        }
    }

    missing
}

/// Whether the registry allows paths beyond MAX_PATH
pub async fn windows_long_paths_enabled(ctx: &ScanContext) -> bool {
    let output = ctx
        .run(
            &CommandLine::new("reg")
                .args(["query", FILESYSTEM_KEY, "/v", LONG_PATHS_VALUE]),
        )
        .await;
    output.success() && output.stdout.contains("0x1")
}

/// Whether git is configured system wide for long paths
pub async fn git_long_paths_enabled(ctx: &ScanContext) -> bool {
    let output = ctx
        .run(&CommandLine::new("git").args(["config", "--system", "--get", "core.longpaths"]))
        .await;
    output.success() && output.stdout.trim().eq_ignore_ascii_case("true")
}

/// Switches the registry long path support on, returning the error text on failure
pub async fn enable_windows_long_paths(ctx: &ScanContext) -> Option<String> {
    let command = CommandLine::new("reg").args([
        "add",
        FILESYSTEM_KEY,
        "/v",
        LONG_PATHS_VALUE,
        "/t",
        "REG_DWORD",
        "/d",
        "1",
        "/f",
    ]);
    ctx.run(&command).await.error_message()
}

/// Switches git long path support on, returning the error text on failure
pub async fn enable_git_long_paths(ctx: &ScanContext) -> Option<String> {
    let command = CommandLine::new("git").args(["config", "--system", "core.longpaths", "true"]);
    ctx.run(&command).await.error_message()
}
