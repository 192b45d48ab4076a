//! Execution context for one scan
//!
//! Contains all state a stage needs:
//! - the log sink and the task id counter
//! - the command runner with the configured timeouts
//! - the staging workspace

use deepscan_core::domain::task::Task;
use deepscan_core::domain::violation::Violation;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ScanConfig;
use crate::error::Result;
use crate::log::LogSink;
use crate::process::{CommandLine, CommandOutput, CommandRunner};
use crate::workspace::{Templates, Workspace};

/// State shared by the stages of one scan run
pub struct ScanContext {
    run_id: Uuid,
    config: ScanConfig,
    workspace: Workspace,
    logger: Arc<dyn LogSink>,
    runner: Arc<dyn CommandRunner>,

    /// Last task id handed out, private to this run
    task_counter: u64,
    failed_stages: usize,
    violations: Vec<Violation>,
}

impl ScanContext {
    /// Creates a context for a new run
    pub fn new(
        run_id: Uuid,
        config: ScanConfig,
        logger: Arc<dyn LogSink>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let workspace = Workspace::new(
            config.workspace_dir.clone(),
            Templates::new(config.template_dir.clone()),
        );

        Self {
            run_id,
            config,
            workspace,
            logger,
            runner,
            task_counter: 0,
            failed_stages: 0,
            violations: Vec::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Number of stages that ended as failed so far
    pub fn failed_stages(&self) -> usize {
        self.failed_stages
    }

    pub(crate) fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Hands out the next task id
    pub fn next_task_id(&mut self) -> u64 {
        self.task_counter += 1;
        self.task_counter
    }

    /// Starts a new task and returns its id
    pub fn begin(&mut self, name: impl Into<String>) -> u64 {
        let id = self.next_task_id();
        let name = name.into();
        info!("[{}] {}", id, name);
        self.logger.record(Task::started(id, name).into());
        id
    }

    /// Marks a task as completed under a new name
    pub fn complete(&self, id: u64, name: impl Into<String>) {
        let name = name.into();
        debug!("[{}] completed: {}", id, name);
        self.logger.record(Task::completed(id, name).into());
    }

    /// Marks a task as failed with the error text as its name
    pub fn fail(&mut self, id: u64, message: impl Into<String>) {
        let message = message.into();
        warn!("[{}] failed: {}", id, message);
        self.failed_stages += 1;
        self.logger.record(Task::failed(id, message).into());
    }

    /// Completes the task as `done`, or fails it when `error` is set
    pub fn resolve(&mut self, id: u64, error: Option<String>, done: impl Into<String>) -> bool {
        match error {
            Some(message) => {
                self.fail(id, message);
                false
            }
            None => {
                self.complete(id, done);
                true
            }
        }
    }

    /// Logs a violation found in the evaluation report
    pub fn violation(&mut self, violation: Violation) {
        self.violations.push(violation.clone());
        self.logger.record(violation.into());
    }

    /// Runs a filesystem stage as one task
    ///
    /// The task fails with the error text when `op` fails, and the error is
    /// returned so the scan stops.
    pub fn fs_stage<T>(
        &mut self,
        start: impl Into<String>,
        done: impl Into<String>,
        op: impl FnOnce(&Workspace) -> Result<T>,
    ) -> Result<T> {
        let id = self.begin(start);
        match op(&self.workspace) {
            Ok(value) => {
                self.complete(id, done);
                Ok(value)
            }
            Err(e) => {
                self.fail(id, e.to_string());
                Err(e)
            }
        }
    }

    /// Runs a short external command
    pub async fn run(&self, command: &CommandLine) -> CommandOutput {
        self.run_with_timeout(command, self.config.command_timeout)
            .await
    }

    /// Runs an external command that may take as long as a container run
    pub async fn run_long(&self, command: &CommandLine) -> CommandOutput {
        self.run_with_timeout(command, self.config.container_timeout)
            .await
    }

    async fn run_with_timeout(&self, command: &CommandLine, timeout: Duration) -> CommandOutput {
        debug!("Running command: {}", command);
        let output = self.runner.run(command, timeout).await;

        if !output.stdout.trim().is_empty() {
            debug!("{} stdout: {}", command.program, output.stdout.trim());
        }
        if !output.stderr.trim().is_empty() {
            debug!("{} stderr: {}", command.program, output.stderr.trim());
        }

        output
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::context;
    use super::*;
    use crate::error::ScanError;
    use crate::process::fake::ScriptedRunner;
    use deepscan_core::domain::task::TaskStatus;

    #[test]
    fn test_task_ids_increase_in_call_order() {
        let dir = tempfile::tempdir().unwrap();
        let (mut ctx, sink, _) = context(dir.path(), ScriptedRunner::new());

        let first = ctx.begin("first");
        let second = ctx.begin("second");
        ctx.complete(first, "first done");

        assert_eq!((first, second), (1, 2));
        let log = sink.snapshot();
        assert_eq!(log.tasks[0].status, TaskStatus::Completed);
        assert_eq!(log.tasks[1].status, TaskStatus::InProgress);
    }

    #[test]
    fn test_fs_stage_failure_is_logged_and_returned() {
        let dir = tempfile::tempdir().unwrap();
        let (mut ctx, sink, _) = context(dir.path(), ScriptedRunner::new());

        let result: Result<()> = ctx.fs_stage("Copying", "Copied", |_| {
            Err(ScanError::io(
                "failed to copy",
                std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            ))
        });

        assert!(result.is_err());
        assert_eq!(ctx.failed_stages(), 1);
        let task = &sink.snapshot().tasks[0];
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.name, "failed to copy: gone");
    }

    #[test]
    fn test_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let (mut ctx, sink, _) = context(dir.path(), ScriptedRunner::new());

        let id = ctx.begin("Building docker image");
        assert!(!ctx.resolve(id, Some("no such file".to_string()), "Docker image built"));
        let id = ctx.begin("Creating docker container");
        assert!(ctx.resolve(id, None, "Docker container created"));

        let log = sink.snapshot();
        assert_eq!(log.tasks[0].name, "no such file");
        assert_eq!(log.tasks[1].name, "Docker container created");
    }
}
