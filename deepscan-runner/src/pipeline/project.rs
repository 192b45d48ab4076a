//! Scan of a project on the local filesystem

use async_trait::async_trait;
use deepscan_core::domain::options::ProjectOptions;
use std::path::Path;

use super::context::ScanContext;
use super::variant::ScanVariant;
use crate::error::Result;
use crate::workspace::{CONFIG_SUBPATH, Template};

pub struct ProjectScan {
    options: ProjectOptions,
}

impl ProjectScan {
    pub fn new(options: ProjectOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl ScanVariant for ProjectScan {
    fn kind(&self) -> &'static str {
        "project"
    }

    async fn prepare_workspace(&self, ctx: &mut ScanContext) -> Result<()> {
        ctx.fs_stage(
            "Copying Dockerfile to the scan project",
            "Copied Dockerfile to the scan project",
            |ws| ws.stage_template(Template::ProjectDockerfile, "Dockerfile"),
        )?;

        ctx.fs_stage(
            "Copying project files to the scan project",
            "Copied project files to the scan project",
            |ws| ws.stage_tree(&self.options.project_path, ""),
        )?;

        ctx.fs_stage(
            "Copying ORT config files to the scan project",
            "Copied ORT config files to the scan project",
            |ws| ws.stage_tree(&self.options.project_config_path, CONFIG_SUBPATH),
        )?;

        Ok(())
    }

    fn results_path(&self) -> Option<&Path> {
        self.options.project_results_path.as_deref()
    }
}
