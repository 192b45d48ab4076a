//! Scan of a project hosted in a git repository
//!
//! Both the project and its policy configuration are shallow clones. On
//! Windows the checkout can exceed MAX_PATH, so long path support must be
//! on before cloning.

use async_trait::async_trait;
use deepscan_core::domain::options::GitProjectOptions;
use std::path::Path;
use tracing::debug;

use super::context::ScanContext;
use super::dependencies::{
    enable_git_long_paths, enable_windows_long_paths, git_long_paths_enabled,
    windows_long_paths_enabled,
};
use super::variant::ScanVariant;
use crate::error::Result;
use crate::process::{CommandLine, MESSAGE_LINE_SEPARATOR};
use crate::workspace::{CONFIG_SUBPATH, TEMP_SUBPATH, Template};

pub struct GitProjectScan {
    options: GitProjectOptions,
    windows: bool,
}

impl GitProjectScan {
    pub fn new(options: GitProjectOptions) -> Self {
        Self::for_platform(options, cfg!(windows))
    }

    /// Creates the scan as if running on Windows or not
    pub fn for_platform(options: GitProjectOptions, windows: bool) -> Self {
        Self { options, windows }
    }

    async fn enable_long_paths(&self, ctx: &mut ScanContext) {
        let id = ctx.begin("Enabling Windows long path support");
        let mut errors = Vec::new();

        if !windows_long_paths_enabled(ctx).await {
            errors.extend(enable_windows_long_paths(ctx).await);
        }
        if !git_long_paths_enabled(ctx).await {
            errors.extend(enable_git_long_paths(ctx).await);
        }

        let error = (!errors.is_empty()).then(|| errors.join(MESSAGE_LINE_SEPARATOR));
        ctx.resolve(id, error, "Enabled Windows long path support");
    }

    async fn checkout_project(&self, ctx: &mut ScanContext) -> Result<()> {
        let dest = ctx.workspace().absolute_root()?;
        let id = ctx.begin("Checking out project from git repository");

        let output = ctx
            .run_long(&clone(&self.options.project_url, &self.options.project_branch, &dest))
            .await;
        ctx.workspace().remove_git_metadata("")?;

        ctx.resolve(id, output.error_message(), "Project checked out");
        Ok(())
    }

    async fn checkout_config(&self, ctx: &mut ScanContext) -> Result<()> {
        let id = ctx.begin("Checking out project ORT config from git repository");
        let config_dir = ctx.workspace().create_dir(CONFIG_SUBPATH)?;
        let url = &self.options.project_config_url;
        let branch = &self.options.project_config_branch;

        let error = match &self.options.project_config_folder {
            Some(folder) => {
                let temp_dir = ctx.workspace().create_dir(TEMP_SUBPATH)?;
                let temp_dir = std::path::absolute(&temp_dir).unwrap_or(temp_dir);
                match ctx.run_long(&clone(url, branch, &temp_dir)).await.error_message() {
                    Some(error) => Some(error),
                    None => {
                        debug!("Extracting config folder {}", folder);
                        let staged = ctx
                            .workspace()
                            .stage_tree(&temp_dir.join(folder), CONFIG_SUBPATH);
                        ctx.workspace().remove_dir(TEMP_SUBPATH)?;
                        staged.err().map(|e| e.to_string())
                    }
                }
            }
            None => {
                let config_dir = std::path::absolute(&config_dir).unwrap_or(config_dir);
                ctx.run_long(&clone(url, branch, &config_dir))
                    .await
                    .error_message()
            }
        };
        ctx.workspace().remove_git_metadata(CONFIG_SUBPATH)?;

        ctx.resolve(id, error, "Project ORT config checked out");
        Ok(())
    }
}

fn clone(url: &str, branch: &str, dest: &Path) -> CommandLine {
    CommandLine::new("git")
        .args(["clone", "--quiet", "--depth", "1", "--branch"])
        .arg(branch)
        .arg(url)
        .arg(dest.to_string_lossy())
}

#[async_trait]
impl ScanVariant for GitProjectScan {
    fn kind(&self) -> &'static str {
        "git-project"
    }

    async fn check_extra_dependencies(&self, ctx: &mut ScanContext) -> Vec<String> {
        if !self.windows {
            return Vec::new();
        }

        if self.options.enable_long_path {
            self.enable_long_paths(ctx).await;
            return Vec::new();
        }

        let mut missing = Vec::new();
        if !windows_long_paths_enabled(ctx).await {
            missing.push("Windows long path support is disabled".to_string());
        }
        if !git_long_paths_enabled(ctx).await {
            missing.push("git long path support is disabled".to_string());
        }
        missing
    }

    async fn prepare_workspace(&self, ctx: &mut ScanContext) -> Result<()> {
        self.checkout_project(ctx).await?;
        self.checkout_config(ctx).await?;

        ctx.fs_stage(
            "Copying Dockerfile to the scan project",
            "Copied Dockerfile to the scan project",
            |ws| ws.stage_template(Template::ProjectDockerfile, "Dockerfile"),
        )?;

        Ok(())
    }

    fn results_path(&self) -> Option<&Path> {
        self.options.project_results_path.as_deref()
    }
}
