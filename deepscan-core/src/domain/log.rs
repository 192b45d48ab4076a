//! Scan log domain types

use serde::{Deserialize, Serialize};

use crate::domain::task::Task;
use crate::domain::violation::Violation;

/// One entry reported to a log sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    Task(Task),
    Violation(Violation),
}

impl From<Task> for LogRecord {
    fn from(task: Task) -> Self {
        LogRecord::Task(task)
    }
}

impl From<Violation> for LogRecord {
    fn from(violation: Violation) -> Self {
        LogRecord::Violation(violation)
    }
}

/// Progress and findings of one scan
///
/// Tasks keep first-seen order, violations keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanLog {
    pub tasks: Vec<Task>,
    pub violations: Vec<Violation>,
}

impl ScanLog {
    /// Tasks that ended in failure
    pub fn failed_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == crate::domain::task::TaskStatus::Failed)
    }
}
