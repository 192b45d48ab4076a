//! Scan Service
//!
//! Runs scans against the server-wide log, one at a time.

use deepscan_core::dto::scan::PackageScanRequest;
use deepscan_runner::{ScanError, ScanOutcome, ScanPipeline};

use crate::state::AppState;

/// Service error type
#[derive(Debug)]
pub enum ScanServiceError {
    /// The scan could not start or aborted on a fatal error
    Scan(ScanError),
    /// The task driving the scan panicked or was cancelled
    Interrupted(String),
}

impl From<ScanError> for ScanServiceError {
    fn from(err: ScanError) -> Self {
        ScanServiceError::Scan(err)
    }
}

/// Runs a package scan once every earlier scan has finished
///
/// The scan runs on its own task holding the queue slot, so it reaches its
/// cleanup stages even when the caller stops waiting for it. The server-wide
/// log is cleared when the scan starts.
pub async fn scan_package(
    state: &AppState,
    request: PackageScanRequest,
) -> Result<ScanOutcome, ScanServiceError> {
    let options = request.into_options(&state.config.default_config_repo);

    let pipeline = ScanPipeline::with_runner(
        state.config.scan.clone(),
        options,
        state.sink.clone(),
        state.runner.clone(),
    )?;
    let run_id = pipeline.run_id();

    tracing::debug!("Scan {} queued", run_id);
    let slot = state.queue.clone().lock_owned().await;
    let sink = state.sink.clone();

    let scan = tokio::spawn(async move {
        let _slot = slot;
        sink.reset();
        tracing::info!("Scan {} started", run_id);
        pipeline.run().await
    });

    let outcome = scan
        .await
        .map_err(|e| ScanServiceError::Interrupted(e.to_string()))??;
    Ok(outcome)
}
