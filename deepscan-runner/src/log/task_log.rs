//! In-memory scan log with per-id task merging

use deepscan_core::domain::log::{LogRecord, ScanLog};
use deepscan_core::domain::task::Task;
use deepscan_core::domain::violation::Violation;

/// Append-only ledger of tasks and violations
///
/// Not synchronized: one writer at a time. Sinks shared across threads
/// wrap it in a mutex.
#[derive(Debug, Clone, Default)]
pub struct TaskLog {
    log: ScanLog,
}

impl TaskLog {
    /// Creates an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a task or violation
    pub fn record(&mut self, record: LogRecord) {
        match record {
            LogRecord::Task(task) => {
                self.record_task(task);
            }
            LogRecord::Violation(violation) => self.record_violation(violation),
        }
    }

    /// Records a task, merging it into an existing entry with the same id
    ///
    /// The existing entry keeps its position and takes the new status and
    /// name. Returns `true` when the id was seen for the first time.
    pub fn record_task(&mut self, task: Task) -> bool {
        match self.log.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => {
                existing.status = task.status;
                existing.name = task.name;
                false
            }
            None => {
                self.log.tasks.push(task);
                true
            }
        }
    }

    /// Appends a violation
    pub fn record_violation(&mut self, violation: Violation) {
        self.log.violations.push(violation);
    }

    /// Clears tasks and violations
    pub fn reset(&mut self) {
        self.log.tasks.clear();
        self.log.violations.clear();
    }

    pub fn tasks(&self) -> &[Task] {
        &self.log.tasks
    }

    pub fn violations(&self) -> &[Violation] {
        &self.log.violations
    }

    /// Returns a copy of the current state
    pub fn snapshot(&self) -> ScanLog {
        self.log.clone()
    }

    /// Renders one line per task, joined by `separator`
    pub fn render_tasks(&self, separator: &str) -> String {
        self.log
            .tasks
            .iter()
            .map(format_task)
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Renders one line per violation, joined by `separator`
    pub fn render_violations(&self, separator: &str) -> String {
        self.log
            .violations
            .iter()
            .map(format_violation)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Formats a task as `{id}( {status} ) -> {name}`
pub fn format_task(task: &Task) -> String {
    format!("{}( {} ) -> {}", task.id, task.status, task.name)
}

/// Formats a violation as `( {severity} ){rule}: {message}`
pub fn format_violation(violation: &Violation) -> String {
    format!(
        "( {} ){}: {}",
        violation.severity, violation.rule, violation.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepscan_core::domain::task::TaskStatus;

    fn violation(license: &str) -> Violation {
        Violation {
            rule: "UNHANDLED_LICENSE".to_string(),
            package_name: "NPM::left-pad:1.3.0".to_string(),
            license: license.to_string(),
            license_source: "DETECTED".to_string(),
            severity: "ERROR".to_string(),
            message: format!("{} is not covered", license),
        }
    }

    #[test]
    fn test_same_id_merges_in_place() {
        let mut log = TaskLog::new();
        assert!(log.record_task(Task::started(1, "Building docker image")));
        assert!(log.record_task(Task::started(2, "Creating docker container")));
        assert!(!log.record_task(Task::failed(1, "no such file")));

        assert_eq!(log.tasks().len(), 2);
        assert_eq!(log.tasks()[0].id, 1);
        assert_eq!(log.tasks()[0].status, TaskStatus::Failed);
        assert_eq!(log.tasks()[0].name, "no such file");
        assert_eq!(log.tasks()[1].status, TaskStatus::InProgress);
    }

    #[test]
    fn test_latest_status_wins() {
        let mut log = TaskLog::new();
        log.record(Task::started(7, "a").into());
        log.record(Task::failed(7, "b").into());
        log.record(Task::completed(7, "c").into());

        assert_eq!(log.tasks().len(), 1);
        assert_eq!(log.tasks()[0].status, TaskStatus::Completed);
        assert_eq!(log.tasks()[0].name, "c");
    }

    #[test]
    fn test_violations_are_additive() {
        let mut log = TaskLog::new();
        log.record(violation("MIT").into());
        log.record(violation("MIT").into());
        log.record(Task::started(1, "a").into());
        log.record(violation("GPL-3.0").into());

        assert_eq!(log.violations().len(), 3);
        assert_eq!(log.violations()[2].license, "GPL-3.0");

        log.reset();
        assert!(log.violations().is_empty());
        assert!(log.tasks().is_empty());
    }

    #[test]
    fn test_render() {
        let mut log = TaskLog::new();
        log.record_task(Task::completed(1, "Dependencies checked"));
        log.record_task(Task::started(2, "Building docker image"));
        log.record_violation(violation("NOASSERTION"));

        assert_eq!(
            log.render_tasks("<br>"),
            "1( Completed ) -> Dependencies checked<br>2( In Progress ) -> Building docker image"
        );
        assert_eq!(
            log.render_violations("\n"),
            "( ERROR )UNHANDLED_LICENSE: NOASSERTION is not covered"
        );
        assert_eq!(TaskLog::new().render_tasks("<br>"), "");
    }
}
