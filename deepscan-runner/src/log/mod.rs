//! Scan progress logging
//!
//! A scan reports every stage as a [`Task`] and every policy breach as a
//! [`Violation`] to a [`LogSink`]. Sinks store records in a [`TaskLog`] and
//! differ only in their side effects:
//! - [`TerminalSink`]: spinners and printed lines while the scan runs
//! - [`StreamSink`]: nothing at record time, snapshots pulled by a client
//!
//! [`Task`]: deepscan_core::domain::task::Task
//! [`Violation`]: deepscan_core::domain::violation::Violation

mod stream;
mod task_log;
mod terminal;

pub use stream::StreamSink;
pub use task_log::{TaskLog, format_task, format_violation};
pub use terminal::TerminalSink;

use deepscan_core::domain::log::{LogRecord, ScanLog};

/// Consumer of scan progress records
///
/// Records arrive from the single pipeline that owns the sink. Readers on
/// other threads only ever take snapshots.
pub trait LogSink: Send + Sync {
    /// Receives one task or violation record
    fn record(&self, record: LogRecord);

    /// Returns a copy of everything recorded so far
    fn snapshot(&self) -> ScanLog;
}
