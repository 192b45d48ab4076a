//! Shared application state

use deepscan_runner::StreamSink;
use deepscan_runner::process::{CommandRunner, SystemRunner};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Serializes scans: the staging directory is shared by every run
pub type ScanQueue = Mutex<()>;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Server-wide log read by the SSE endpoints
    pub sink: Arc<StreamSink>,
    pub queue: Arc<ScanQueue>,
    pub runner: Arc<dyn CommandRunner>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    pub fn with_runner(config: ServerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config: Arc::new(config),
            sink: Arc::new(StreamSink::new()),
            queue: Arc::new(Mutex::new(())),
            runner,
        }
    }
}
