use async_trait::async_trait;
use std::path::Path;

use super::context::ScanContext;
use crate::error::Result;

/// The part of a scan that differs between scan kinds
///
/// The pipeline runs the same stages for every kind of scan and calls into
/// the variant where the kinds differ: extra prerequisites and the content
/// of the build context.
#[async_trait]
pub trait ScanVariant: Send + Sync {
    /// Short name of the scan kind, used in diagnostics
    fn kind(&self) -> &'static str;

    /// Checks prerequisites beyond git and docker
    ///
    /// Runs while the dependency task is open. Returns a description of
    /// every unmet prerequisite.
    async fn check_extra_dependencies(&self, _ctx: &mut ScanContext) -> Vec<String> {
        Vec::new()
    }

    /// Stages the variant's files into the freshly created workspace
    async fn prepare_workspace(&self, ctx: &mut ScanContext) -> Result<()>;

    /// Directory receiving the result files, if requested
    fn results_path(&self) -> Option<&Path> {
        None
    }
}
