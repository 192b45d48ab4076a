//! Log sink rendering progress on the terminal
//!
//! Each task gets a spinner the first time its id is seen. The spinner is
//! resolved as succeeded or failed once the task reaches a terminal status.
//! Violations are printed as soon as they arrive.

use colored::*;
use deepscan_core::domain::log::{LogRecord, ScanLog};
use deepscan_core::domain::task::{Task, TaskStatus};
use deepscan_core::domain::violation::Violation;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::LogSink;
use super::task_log::TaskLog;
use crate::process::MESSAGE_LINE_SEPARATOR;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Sink driving spinners and printed lines on stderr
pub struct TerminalSink {
    progress: MultiProgress,
    state: Mutex<TerminalState>,
}

#[derive(Default)]
struct TerminalState {
    log: TaskLog,
    spinners: HashMap<u64, ProgressBar>,
}

impl TerminalSink {
    /// Creates a sink drawing to stderr
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// Creates a sink drawing to the given target
    pub fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            progress: MultiProgress::with_draw_target(target),
            state: Mutex::new(TerminalState::default()),
        }
    }

    /// Number of spinners still waiting for a terminal status
    pub fn active_spinners(&self) -> usize {
        self.lock().spinners.len()
    }

    fn lock(&self) -> MutexGuard<'_, TerminalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_task(&self, state: &mut TerminalState, task: Task) {
        let first_seen = state.log.record_task(task.clone());

        if first_seen {
            let spinner = self.progress.add(ProgressBar::new_spinner());
            if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message(task.name.clone());
            spinner.enable_steady_tick(TICK_INTERVAL);
            state.spinners.insert(task.id, spinner);
        }

        if !task.is_finished() {
            if let Some(spinner) = state.spinners.get(&task.id) {
                spinner.set_message(task.name);
            }
            return;
        }

        let line = if task.status == TaskStatus::Failed {
            format!(
                "{} {}",
                "✖".red(),
                task.name.replace(MESSAGE_LINE_SEPARATOR, "\n  ").red()
            )
        } else {
            format!("{} {}", "✔".green(), task.name)
        };

        if let Some(spinner) = state.spinners.remove(&task.id) {
            if let Ok(style) = ProgressStyle::with_template("{msg}") {
                spinner.set_style(style);
            }
            spinner.finish_with_message(line);
        }
    }

    fn on_violation(&self, state: &mut TerminalState, violation: Violation) {
        let line = format!(
            "{} {} -> {}",
            format!(" {} ", violation.severity).white().on_red(),
            violation.package_name.green(),
            violation.message
        );
        self.print_line(&line);
        state.log.record_violation(violation);
    }

    /// Whether lines bypass the progress display
    ///
    /// A hidden draw target (stderr not a terminal) swallows `println`.
    fn prints_directly(&self) -> bool {
        self.progress.is_hidden()
    }

    fn print_line(&self, line: &str) {
        if self.prints_directly() || self.progress.println(line).is_err() {
            eprintln!("{}", line);
        }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for TerminalSink {
    fn record(&self, record: LogRecord) {
        let mut state = self.lock();
        match record {
            LogRecord::Task(task) => self.on_task(&mut state, task),
            LogRecord::Violation(violation) => self.on_violation(&mut state, violation),
        }
    }

    fn snapshot(&self) -> ScanLog {
        self.lock().log.snapshot()
    }
}
