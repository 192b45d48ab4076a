//! Log sink for pull-based transports
//!
//! Records are only stored. A subscribed client (the server's SSE
//! endpoints) pulls the latest rendering whenever it asks; intermediate
//! states between two pulls are not delivered.

use deepscan_core::domain::log::{LogRecord, ScanLog};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::LogSink;
use super::task_log::TaskLog;

/// Separator between rendered lines in snapshots
pub const SNAPSHOT_SEPARATOR: &str = "<br>";

/// Sink exposing rendered snapshots on demand
#[derive(Debug, Default)]
pub struct StreamSink {
    log: Mutex<TaskLog>,
}

impl StreamSink {
    /// Creates an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Current task list rendered for display
    pub fn snapshot_tasks(&self) -> String {
        self.lock().render_tasks(SNAPSHOT_SEPARATOR)
    }

    /// Current violation list rendered for display
    pub fn snapshot_violations(&self) -> String {
        self.lock().render_violations(SNAPSHOT_SEPARATOR)
    }

    /// Clears all stored records
    pub fn reset(&self) {
        self.lock().reset();
    }

    fn lock(&self) -> MutexGuard<'_, TaskLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for StreamSink {
    fn record(&self, record: LogRecord) {
        self.lock().record(record);
    }

    fn snapshot(&self) -> ScanLog {
        self.lock().snapshot()
    }
}
