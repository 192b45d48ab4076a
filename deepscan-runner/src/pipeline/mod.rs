//! Scan pipeline
//!
//! Runs the fixed stage sequence of a scan:
//! 1. Check that git and docker are usable
//! 2. Recreate the workspace and stage the build context
//! 3. Build the image and run the scan container to completion
//! 4. Tear the container down
//! 5. Log the violations found in the reports
//! 6. Copy the reports out and clean the workspace
//!
//! The scan kind only changes the prerequisites and the build context, see
//! [`ScanVariant`]. A failing stage is logged and the pipeline moves on;
//! only unmet prerequisites and unexpected I/O errors stop it.

pub mod context;
pub mod dependencies;
pub mod git;
pub mod package;
pub mod project;
pub mod variant;

use deepscan_core::domain::options::ScanOptions;
use deepscan_core::domain::violation::Violation;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ScanConfig;
use crate::docker::ContainerManager;
use crate::error::{Result, ScanError};
use crate::log::LogSink;
use crate::process::{CommandRunner, MESSAGE_LINE_SEPARATOR, SystemRunner};
use crate::report::{
    EVALUATION_RESULT_FILE, SCAN_RESULT_FILE, extract_violations, has_evaluation, parse_report,
};
use crate::workspace::Template;

pub use context::ScanContext;
pub use git::GitProjectScan;
pub use package::PackageScan;
pub use project::ProjectScan;
pub use variant::ScanVariant;

/// Summary of a finished scan
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub run_id: Uuid,
    /// Violations in report order
    pub violations: Vec<Violation>,
    /// Number of stages that ended as failed
    pub failed_stages: usize,
}

impl ScanOutcome {
    pub fn has_failures(&self) -> bool {
        self.failed_stages > 0
    }
}

/// One scan, ready to run
pub struct ScanPipeline {
    ctx: ScanContext,
    variant: Box<dyn ScanVariant>,
    containers: ContainerManager,
}

impl ScanPipeline {
    /// Creates a pipeline running real git and docker commands
    pub fn new(config: ScanConfig, options: ScanOptions, logger: Arc<dyn LogSink>) -> Result<Self> {
        Self::with_runner(config, options, logger, Arc::new(SystemRunner))
    }

    /// Creates a pipeline executing commands through `runner`
    pub fn with_runner(
        config: ScanConfig,
        options: ScanOptions,
        logger: Arc<dyn LogSink>,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        options.validate()?;

        let run_id = Uuid::new_v4();
        let variant = variant_for(options);

        Ok(Self {
            ctx: ScanContext::new(run_id, config, logger, runner),
            variant,
            containers: ContainerManager::for_run(run_id),
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.ctx.run_id()
    }

    /// Name of the image and container used by this run
    pub fn container_name(&self) -> &str {
        self.containers.name()
    }

    /// Runs every stage in order
    pub async fn run(self) -> Result<ScanOutcome> {
        let Self {
            mut ctx,
            variant,
            containers,
        } = self;

        info!(
            "Starting {} scan {} in {}",
            variant.kind(),
            ctx.run_id(),
            ctx.workspace().root().display()
        );

        check_dependencies(&mut ctx, variant.as_ref()).await?;

        clean_workspace(&mut ctx)?;
        ctx.fs_stage(
            "Creating scan project directory",
            "Scan project directory created",
            |ws| ws.create(),
        )?;

        variant.prepare_workspace(&mut ctx).await?;

        ctx.fs_stage(
            "Copying entrypoint.sh to the scan project",
            "Copied entrypoint.sh to the scan project",
            |ws| ws.stage_template(Template::Entrypoint, "entrypoint.sh"),
        )?;

        containers.build(&mut ctx).await?;
        containers.pre_clean(&mut ctx).await;
        containers.create(&mut ctx).await?;
        containers.start(&mut ctx).await;
        containers.stop(&mut ctx).await;
        containers.remove(&mut ctx).await;
        if ctx.config().remove_image {
            containers.remove_image(&mut ctx).await;
        }

        let report = evaluation_report(&mut ctx);
        log_violations(&mut ctx, report);

        if let Some(output_dir) = variant.results_path() {
            copy_results(&mut ctx, output_dir)?;
        }

        clean_workspace(&mut ctx)?;

        let outcome = ScanOutcome {
            run_id: ctx.run_id(),
            failed_stages: ctx.failed_stages(),
            violations: ctx.into_violations(),
        };
        info!(
            "Scan {} finished with {} violation(s) and {} failed stage(s)",
            outcome.run_id,
            outcome.violations.len(),
            outcome.failed_stages
        );
        Ok(outcome)
    }
}

fn variant_for(options: ScanOptions) -> Box<dyn ScanVariant> {
    match options {
        ScanOptions::Package(opts) => Box::new(PackageScan::new(opts)),
        ScanOptions::Project(opts) => Box::new(ProjectScan::new(opts)),
        ScanOptions::GitProject(opts) => Box::new(GitProjectScan::new(opts)),
    }
}

async fn check_dependencies(ctx: &mut ScanContext, variant: &dyn ScanVariant) -> Result<()> {
    let id = ctx.begin("Checking dependencies needed for the scan");

    let mut missing = dependencies::check_tools(ctx).await;
    missing.extend(variant.check_extra_dependencies(ctx).await);

    if missing.is_empty() {
        ctx.complete(id, "Dependencies checked");
        return Ok(());
    }

    ctx.fail(id, missing.join(MESSAGE_LINE_SEPARATOR));
    Err(ScanError::MissingDependencies(missing.join(", ")))
}

fn clean_workspace(ctx: &mut ScanContext) -> Result<()> {
    if !ctx.workspace().exists() {
        return Ok(());
    }
    ctx.fs_stage(
        "Cleaning scan project directory",
        "Scan project directory cleaned",
        |ws| ws.remove(),
    )
}

/// Picks the report holding the evaluation
///
/// The scan result carries it when the evaluator ran inside the scanner
/// step; otherwise the evaluator wrote its own report.
fn evaluation_report(ctx: &mut ScanContext) -> &'static str {
    let id = ctx.begin("Checking for evaluation in scan result");

    match parse_report(&ctx.workspace().path(SCAN_RESULT_FILE)) {
        None => {
            ctx.fail(id, "No scan result found");
            EVALUATION_RESULT_FILE
        }
        Some(tree) if has_evaluation(&tree) => {
            ctx.complete(id, "Evaluation found in scan result");
            SCAN_RESULT_FILE
        }
        Some(_) => {
            ctx.complete(id, "No evaluation found in scan result");
            EVALUATION_RESULT_FILE
        }
    }
}

fn log_violations(ctx: &mut ScanContext, report: &str) {
    let id = ctx.begin("Checking for violations");

    let Some(tree) = parse_report(&ctx.workspace().path(report)) else {
        warn!("No evaluation report {} in workspace", report);
        ctx.fail(id, "No evaluation result found");
        return;
    };
    ctx.complete(id, "Violations checked");

    let id = ctx.begin("Logging violations");
    for violation in extract_violations(&tree) {
        ctx.violation(violation);
    }
    ctx.complete(id, "Violations logged");
}

fn copy_results(ctx: &mut ScanContext, output_dir: &Path) -> Result<()> {
    let copied = ctx.fs_stage(
        "Copying scan results to output directory",
        "Copied scan results to output directory",
        |ws| ws.copy_results(output_dir),
    )?;
    info!("Copied {:?} to {}", copied, output_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::StreamSink;
    use crate::process::fake::ScriptedRunner;
    use crate::process::{CommandLine, CommandOutput};
    use deepscan_core::domain::options::{PackageOptions, ProjectOptions};
    use deepscan_core::domain::task::TaskStatus;
    use std::fs;
    use std::path::PathBuf;

    const SCAN_WITH_EVALUATION: &str = r#"
scanner:
  start_time: "2025-01-03T15:50:01Z"
evaluator:
  violations:
  - rule: "UNHANDLED_LICENSE"
    pkg: "NPM::left-pad:1.3.0"
    license: "LicenseRef-scancode-commercial-license"
    license_source: "DETECTED"
    severity: "ERROR"
    message: "The license LicenseRef-scancode-commercial-license is currently not covered by policy rules."
  - rule: "UNHANDLED_LICENSE"
    pkg: "NPM::left-pad:1.3.0"
    license: "NOASSERTION"
    license_source: "DETECTED"
    severity: "ERROR"
    message: "The license NOASSERTION is currently not covered by policy rules."
"#;

    const EVALUATION_ONLY: &str = r#"
evaluator:
  violations:
  - rule: "COPYLEFT_IN_SOURCE"
    pkg: "NPM::app:1.0.0"
    license: "GPL-3.0-only"
    license_source: "DECLARED"
    severity: "WARNING"
    message: "The license GPL-3.0-only is a copyleft license."
"#;

    fn package_options() -> ScanOptions {
        ScanOptions::Package(PackageOptions {
            package_name: "left-pad".to_string(),
            package_version: "1.3.0".to_string(),
            ort_config_repo_url: "https://example.com/cfg.git".to_string(),
        })
    }

    /// Runner whose container start writes the given reports into `workspace`
    fn runner_writing(workspace: PathBuf, reports: Vec<(&'static str, &'static str)>) -> ScriptedRunner {
        ScriptedRunner::new().respond_with(
            "docker container start",
            CommandOutput::ok(""),
            move |_: &CommandLine| {
                for (file, content) in &reports {
                    fs::write(workspace.join(file), content).unwrap();
                }
            },
        )
    }

    fn pipeline(
        dir: &Path,
        options: ScanOptions,
        runner: ScriptedRunner,
    ) -> (ScanPipeline, Arc<StreamSink>, Arc<ScriptedRunner>) {
        let sink = Arc::new(StreamSink::new());
        let runner = Arc::new(runner);
        let config = ScanConfig::new(dir.join("project-scan"));
        let pipeline =
            ScanPipeline::with_runner(config, options, sink.clone(), runner.clone()).unwrap();
        (pipeline, sink, runner)
    }

    #[tokio::test]
    async fn test_package_scan_happy_path() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().join("project-scan");
        let runner = runner_writing(workspace.clone(), vec![(SCAN_RESULT_FILE, SCAN_WITH_EVALUATION)]);
        let (pipeline, sink, runner) = pipeline(dir.path(), package_options(), runner);
        let name = pipeline.container_name().to_string();

        let outcome = pipeline.run().await.unwrap();

        assert_eq!(outcome.violations.len(), 2);
        assert_eq!(outcome.violations[1].license, "NOASSERTION");
        assert!(!outcome.has_failures());
        assert!(!workspace.exists());

        let log = sink.snapshot();
        assert_eq!(log.violations, outcome.violations);
        assert!(log.tasks.iter().all(|t| t.status == TaskStatus::Completed));
        let ids: Vec<u64> = log.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, (1..=ids.len() as u64).collect::<Vec<_>>());
        assert_eq!(log.tasks[0].name, "Dependencies checked");
        assert_eq!(
            log.tasks.last().unwrap().name,
            "Scan project directory cleaned"
        );

        let build = runner.position("docker image build").unwrap();
        let create = runner.position("docker container create").unwrap();
        let start = runner.position("docker container start").unwrap();
        let remove_image = runner.position("docker image rm").unwrap();
        assert!(build < create && create < start && start < remove_image);
        assert!(runner.called(&format!("docker container start --attach --interactive {}", name)));
    }

    #[tokio::test]
    async fn test_failed_stage_does_not_stop_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new()
            .respond("docker image build", CommandOutput::failed(1, "no such file"));
        let (pipeline, sink, runner) = pipeline(dir.path(), package_options(), runner);

        let outcome = pipeline.run().await.unwrap();

        let log = sink.snapshot();
        let build = log.tasks.iter().find(|t| t.name == "no such file").unwrap();
        assert_eq!(build.status, TaskStatus::Failed);
        assert!(runner.called("docker container create"));
        assert!(outcome.has_failures());
    }

    #[tokio::test]
    async fn test_missing_dependencies_abort_before_build() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new().respond(
            "docker info",
            CommandOutput::failed(1, "Cannot connect to the Docker daemon"),
        );
        let (pipeline, sink, runner) = pipeline(dir.path(), package_options(), runner);

        let err = pipeline.run().await.unwrap_err();

        assert!(err.is_missing_dependencies());
        assert!(!runner.called("docker image build"));
        assert!(!dir.path().join("project-scan").exists());

        let log = sink.snapshot();
        assert_eq!(log.tasks.len(), 1);
        assert_eq!(log.tasks[0].status, TaskStatus::Failed);
        assert_eq!(log.tasks[0].name, "docker is not running");
    }

    #[tokio::test]
    async fn test_project_scan_reads_evaluation_report_and_copies_results() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("app");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("package.json"), "{}").unwrap();
        let config = dir.path().join("ort-config");
        fs::create_dir_all(&config).unwrap();
        let output = dir.path().join("results");

        let workspace = dir.path().join("project-scan");
        let runner = runner_writing(
            workspace.clone(),
            vec![
                (SCAN_RESULT_FILE, "scanner:\n  scanners: {}\n"),
                (EVALUATION_RESULT_FILE, EVALUATION_ONLY),
                ("bom.cyclonedx.json", "{}"),
            ],
        );
        let options = ScanOptions::Project(ProjectOptions {
            project_path: project,
            project_config_path: config,
            project_results_path: Some(output.clone()),
        });
        let (pipeline, sink, _) = pipeline(dir.path(), options, runner);

        let outcome = pipeline.run().await.unwrap();

        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].rule, "COPYLEFT_IN_SOURCE");
        assert!(output.join(EVALUATION_RESULT_FILE).is_file());
        assert!(output.join("bom.cyclonedx.json").is_file());
        assert!(!output.join("scan-report-web-app.html").exists());
        assert!(!workspace.exists());

        let log = sink.snapshot();
        assert!(log.tasks.iter().any(|t| t.name == "No evaluation found in scan result"));
        assert!(log.tasks.iter().any(|t| t.name == "Copied scan results to output directory"));
    }

    #[tokio::test]
    async fn test_missing_reports_are_benign() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, sink, _) = pipeline(dir.path(), package_options(), ScriptedRunner::new());

        let outcome = pipeline.run().await.unwrap();

        assert!(outcome.violations.is_empty());
        assert_eq!(outcome.failed_stages, 2);
        let failed: Vec<String> = sink.snapshot().failed_tasks().map(|t| t.name.clone()).collect();
        assert_eq!(failed, vec!["No scan result found", "No evaluation result found"]);
    }

    #[tokio::test]
    async fn test_stale_workspace_is_wiped() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().join("project-scan");
        fs::create_dir_all(&workspace).unwrap();
        fs::write(workspace.join(SCAN_RESULT_FILE), SCAN_WITH_EVALUATION).unwrap();

        let (pipeline, sink, _) = pipeline(dir.path(), package_options(), ScriptedRunner::new());
        let outcome = pipeline.run().await.unwrap();

        // The report of the previous scan must not be picked up
        assert!(outcome.violations.is_empty());
        assert_eq!(sink.snapshot().tasks[1].name, "Scan project directory cleaned");
    }

    #[tokio::test]
    async fn test_image_kept_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(StreamSink::new());
        let runner = Arc::new(ScriptedRunner::new());
        let mut config = ScanConfig::new(dir.path().join("project-scan"));
        config.remove_image = false;

        ScanPipeline::with_runner(config, package_options(), sink, runner.clone())
            .unwrap()
            .run()
            .await
            .unwrap();

        assert!(!runner.called("docker image rm"));
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let options = ScanOptions::Package(PackageOptions {
            package_name: String::new(),
            package_version: "1.3.0".to_string(),
            ort_config_repo_url: "https://example.com/cfg.git".to_string(),
        });

        let result = ScanPipeline::with_runner(
            ScanConfig::new(dir.path().join("project-scan")),
            options,
            Arc::new(StreamSink::new()),
            Arc::new(ScriptedRunner::new()),
        );
        assert!(matches!(result, Err(ScanError::InvalidOptions(_))));
    }
}
