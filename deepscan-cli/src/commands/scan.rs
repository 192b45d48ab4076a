//! Scan execution with terminal progress

use anyhow::{Context, Result};
use colored::*;
use deepscan_core::domain::options::ScanOptions;
use deepscan_core::domain::violation::Violation;
use deepscan_runner::{ScanError, ScanOutcome, ScanPipeline, TerminalSink};
use std::sync::Arc;

use crate::config::Config;

/// Runs one scan and prints a summary
///
/// Exits the process with status 1 when git or docker are unusable.
pub async fn run_scan(options: ScanOptions, config: &Config) -> Result<()> {
    let scan_config = config.scan_config()?;
    let kind = options.kind();
    let sink = Arc::new(TerminalSink::new());

    let pipeline = ScanPipeline::new(scan_config, options, sink)
        .with_context(|| format!("Cannot start {} scan", kind))?;

    println!(
        "{}",
        format!("Starting {} scan {}", kind, pipeline.run_id()).bold()
    );

    match pipeline.run().await {
        Ok(outcome) => {
            print_summary(&outcome);
            Ok(())
        }
        Err(ScanError::MissingDependencies(missing)) => {
            eprintln!("{} {}", "Cannot scan:".red().bold(), missing);
            std::process::exit(1);
        }
        Err(e) => Err(e).context("Scan aborted"),
    }
}

fn print_summary(outcome: &ScanOutcome) {
    println!();
    if outcome.violations.is_empty() {
        println!("{}", "No policy violations found.".green());
    } else {
        println!(
            "{}",
            format!("Found {} policy violation(s):", outcome.violations.len()).bold()
        );
        println!();
        for violation in &outcome.violations {
            print_violation(violation);
        }
    }

    if outcome.has_failures() {
        println!();
        println!(
            "{}",
            format!(
                "{} stage(s) failed, results may be incomplete.",
                outcome.failed_stages
            )
            .yellow()
        );
    }
}

fn print_violation(violation: &Violation) {
    println!(
        "  {} {} {}",
        format!("[{}]", violation.severity).red(),
        violation.rule.bold(),
        violation.package_name.green()
    );
    if !violation.license.is_empty() {
        println!(
            "    {} {} ({})",
            "License:".dimmed(),
            violation.license,
            violation.license_source
        );
    }
    println!("    {}", violation.message);
}
