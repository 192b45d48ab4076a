//! Scan of a published npm package
//!
//! The build context is an empty npm project depending on the package, so
//! the scan tool resolves and scans the package with its dependency tree.

use async_trait::async_trait;
use deepscan_core::domain::options::PackageOptions;

use super::context::ScanContext;
use super::variant::ScanVariant;
use crate::error::Result;
use crate::workspace::{CONFIG_REPO_PLACEHOLDER, Template};

pub struct PackageScan {
    options: PackageOptions,
}

impl PackageScan {
    pub fn new(options: PackageOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl ScanVariant for PackageScan {
    fn kind(&self) -> &'static str {
        "package"
    }

    async fn prepare_workspace(&self, ctx: &mut ScanContext) -> Result<()> {
        let name = &self.options.package_name;
        let version = &self.options.package_version;
        let config_repo = &self.options.ort_config_repo_url;

        let manifest = ctx.fs_stage(
            format!("Adding {}@{} to the scan project dependencies", name, version),
            format!("Added {}@{} to the scan project dependencies", name, version),
            |ws| ws.manifest_with_dependency(name, version),
        )?;

        ctx.fs_stage(
            "Writing package json to the scan project",
            "Written package json to the scan project",
            |ws| ws.write_manifest(&manifest),
        )?;

        ctx.fs_stage(
            "Copying Dockerfile to the scan project",
            "Copied Dockerfile to the scan project",
            |ws| ws.stage_template(Template::PackageDockerfile, "Dockerfile"),
        )?;

        ctx.fs_stage(
            format!("Updating ORT config repo to {}", config_repo),
            format!("Updated ORT config repo to {}", config_repo),
            |ws| ws.substitute("Dockerfile", CONFIG_REPO_PLACEHOLDER, config_repo),
        )?;

        Ok(())
    }
}
