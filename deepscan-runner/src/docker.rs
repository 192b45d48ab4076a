//! Docker container management
//!
//! Handles the container lifecycle of one scan:
//! - Building the scan image from the staged workspace
//! - Creating, starting, stopping and removing the scan container
//! - Removing the per-run image afterwards
//!
//! Image and container share one name derived from the run id, so two runs
//! never fight over the same container.

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::pipeline::context::ScanContext;
use crate::process::CommandLine;

/// Directory inside the container where the scan tool writes its reports
pub const RESULTS_MOUNT: &str = "/home/ort/results";

/// Prefix of every image and container name
pub const NAME_PREFIX: &str = "deep-scan";

/// Lifecycle operations for the image and container of one run
///
/// Every operation is logged as its own task. Failing docker commands mark
/// the task as failed and the scan moves on.
#[derive(Debug, Clone)]
pub struct ContainerManager {
    name: String,
}

impl ContainerManager {
    /// Creates a manager for the container of the given run
    pub fn for_run(run_id: Uuid) -> Self {
        Self {
            name: format!("{}-{}", NAME_PREFIX, run_id.simple()),
        }
    }

    /// Name shared by the image and the container
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a container with this name exists, running or not
    pub async fn exists(&self, ctx: &ScanContext) -> bool {
        let output = ctx
            .run(&docker(["container", "ls", "--all", "--quiet", "--filter"])
                .arg(format!("name={}", self.name)))
            .await;
        let exists = !output.stdout.trim().is_empty();
        debug!("Container {} exists: {}", self.name, exists);
        exists
    }

    /// Builds the image from the workspace
    pub async fn build(&self, ctx: &mut ScanContext) -> Result<bool> {
        let context_dir = ctx.workspace().absolute_root()?;
        let id = ctx.begin("Building docker image");

        let command = docker(["image", "build", "--quiet", "--no-cache", "--tag"])
            .arg(&self.name)
            .arg(context_dir.to_string_lossy());
        let output = ctx.run_long(&command).await;

        Ok(ctx.resolve(id, output.error_message(), "Docker image built"))
    }

    /// Creates the container with the workspace bound as results directory
    pub async fn create(&self, ctx: &mut ScanContext) -> Result<bool> {
        let workspace = ctx.workspace().absolute_root()?;
        let id = ctx.begin("Creating docker container");

        let command = docker(["container", "create", "--volume"])
            .arg(format!("{}:{}:rw", workspace.display(), RESULTS_MOUNT))
            .arg("--name")
            .arg(&self.name)
            .arg(&self.name);
        let output = ctx.run(&command).await;

        Ok(ctx.resolve(id, output.error_message(), "Docker container created"))
    }

    /// Starts the container and waits until the scan tool exits
    pub async fn start(&self, ctx: &mut ScanContext) -> bool {
        let id = ctx.begin("Running docker container");

        let command = docker(["container", "start", "--attach", "--interactive"])
            .arg(&self.name);
        let output = ctx.run_long(&command).await;

        ctx.resolve(id, output.error_message(), "Docker container started")
    }

    /// Stops the container if it exists
    pub async fn stop(&self, ctx: &mut ScanContext) -> bool {
        let id = ctx.begin("Stopping docker container");

        let error = if self.exists(ctx).await {
            let command = docker(["container", "stop"]).arg(&self.name);
            ctx.run(&command).await.error_message()
        } else {
            debug!("Container {} absent, nothing to stop", self.name);
            None
        };

        ctx.resolve(id, error, "Docker container stopped")
    }

    /// Removes the container and its anonymous volumes if it exists
    pub async fn remove(&self, ctx: &mut ScanContext) -> bool {
        let id = ctx.begin("Removing docker container");

        let error = if self.exists(ctx).await {
            let command = docker(["container", "rm", "--volumes"])
                .arg(&self.name);
            ctx.run(&command).await.error_message()
        } else {
            debug!("Container {} absent, nothing to remove", self.name);
            None
        };

        ctx.resolve(id, error, "Docker container removed")
    }

    /// Stops and removes a leftover container with this name
    pub async fn pre_clean(&self, ctx: &mut ScanContext) {
        if self.exists(ctx).await {
            info!("Found leftover container {}, cleaning it up", self.name);
            self.stop(ctx).await;
            self.remove(ctx).await;
        }
    }

    /// Deletes the image built for this run
    pub async fn remove_image(&self, ctx: &mut ScanContext) -> bool {
        let id = ctx.begin("Removing docker image");

        let command = docker(["image", "rm", "--force"]).arg(&self.name);
        let output = ctx.run(&command).await;

        ctx.resolve(id, output.error_message(), "Docker image removed")
    }
}

fn docker<const N: usize>(args: [&str; N]) -> CommandLine {
    CommandLine::new("docker").args(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogSink;
    use crate::pipeline::context::test_support::context;
    use crate::process::CommandOutput;
    use crate::process::fake::ScriptedRunner;
    use deepscan_core::domain::task::TaskStatus;

    #[test]
    fn test_name_is_per_run() {
        let first = ContainerManager::for_run(Uuid::new_v4());
        let second = ContainerManager::for_run(Uuid::new_v4());

        assert!(first.name().starts_with("deep-scan-"));
        assert_ne!(first.name(), second.name());
        // Docker names must not contain uppercase letters
        assert_eq!(first.name(), first.name().to_lowercase());
    }

    #[tokio::test]
    async fn test_stop_and_remove_without_container() {
        let dir = tempfile::tempdir().unwrap();
        let (mut ctx, sink, runner) = context(dir.path(), ScriptedRunner::new());
        let manager = ContainerManager::for_run(ctx.run_id());

        assert!(manager.stop(&mut ctx).await);
        assert!(manager.remove(&mut ctx).await);

        assert!(!runner.called("docker container stop"));
        assert!(!runner.called("docker container rm"));

        let log = sink.snapshot();
        assert_eq!(log.tasks.len(), 2);
        assert_eq!(log.tasks[0].name, "Docker container stopped");
        assert_eq!(log.tasks[1].name, "Docker container removed");
        assert!(log.tasks.iter().all(|t| t.status == TaskStatus::Completed));
    }

    #[tokio::test]
    async fn test_stop_existing_container() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new()
            .respond("docker container ls", CommandOutput::ok("3f2a9c1b\n"));
        let (mut ctx, _, runner) = context(dir.path(), runner);
        let manager = ContainerManager::for_run(ctx.run_id());

        assert!(manager.stop(&mut ctx).await);
        assert!(runner.called(&format!("docker container stop {}", manager.name())));
    }

    #[tokio::test]
    async fn test_build_failure_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new()
            .respond("docker image build", CommandOutput::failed(1, "no such file\n"));
        let (mut ctx, sink, runner) = context(dir.path(), runner);
        let manager = ContainerManager::for_run(ctx.run_id());

        assert!(!manager.build(&mut ctx).await.unwrap());

        let task = &sink.snapshot().tasks[0];
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.name, "no such file");

        let call = &runner.calls()[0];
        assert!(call.starts_with("docker image build --quiet --no-cache --tag deep-scan-"));
        assert!(call.ends_with("project-scan"));
    }

    #[tokio::test]
    async fn test_create_binds_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let (mut ctx, _, runner) = context(dir.path(), ScriptedRunner::new());
        let manager = ContainerManager::for_run(ctx.run_id());

        assert!(manager.create(&mut ctx).await.unwrap());

        let call = &runner.calls()[0];
        assert!(call.contains(":/home/ort/results:rw"));
        assert!(call.ends_with(&format!("--name {0} {0}", manager.name())));
    }

    #[tokio::test]
    async fn test_pre_clean_only_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let (mut ctx, sink, _) = context(dir.path(), ScriptedRunner::new());
        let manager = ContainerManager::for_run(ctx.run_id());

        manager.pre_clean(&mut ctx).await;
        assert!(sink.snapshot().tasks.is_empty());
    }
}
