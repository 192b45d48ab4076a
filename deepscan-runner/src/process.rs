//! External process execution
//!
//! Every stage of a scan shells out to git or docker. Commands run with
//! captured output so the literal error text can be shown to the user.
//! A failed command is data, not an error: the outcome is encoded in
//! [`CommandOutput`] and interpreted by the caller.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, warn};

/// Separator used when a multi-line error is flattened into one message
pub const MESSAGE_LINE_SEPARATOR: &str = "<br>";

/// A program together with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Creates a command line without arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process could not run to completion
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Output of a process that never produced an exit code
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self {
            status: None,
            stdout: String::new(),
            stderr: reason.into(),
        }
    }

    /// Whether the process exited with status zero
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Failure text of the command, if it failed
    ///
    /// Any text on stderr counts as failure and is returned with its lines
    /// joined by [`MESSAGE_LINE_SEPARATOR`]. Without stderr text, a non-zero
    /// exit status is reported.
    pub fn error_message(&self) -> Option<String> {
        let stderr = normalize_lines(&self.stderr);
        if !stderr.is_empty() {
            return Some(stderr);
        }

        match self.status {
            Some(0) => None,
            Some(code) => Some(format!("exited with status {}", code)),
            None => Some("terminated without exit status".to_string()),
        }
    }
}

/// Joins the non-blank lines of `text` with [`MESSAGE_LINE_SEPARATOR`]
pub fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join(MESSAGE_LINE_SEPARATOR)
}

/// Executes external commands
///
/// Implementations never fail: problems are reported through the returned
/// [`CommandOutput`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion or until `timeout` elapses
    async fn run(&self, command: &CommandLine, timeout: Duration) -> CommandOutput;
}

/// Runs commands as child processes of the current process
///
/// Children inherit the working directory and environment. No shell is
/// involved, arguments are passed verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &CommandLine, timeout: Duration) -> CommandOutput {
        let child = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                debug!("Failed to spawn '{}': {}", command, e);
                return CommandOutput::aborted(format!(
                    "failed to execute {}: {}",
                    command.program, e
                ));
            }
        };

        // Dropping the pending future on timeout drops the child, which kills it
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => CommandOutput {
                status: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            },
            Ok(Err(e)) => CommandOutput::aborted(format!(
                "failed to collect output of {}: {}",
                command.program, e
            )),
            Err(_) => {
                warn!("Command '{}' timed out after {:?}", command, timeout);
                CommandOutput::aborted(format!(
                    "command timed out after {}s",
                    timeout.as_secs()
                ))
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_display() {
        let cmd = CommandLine::new("git")
            .arg("clone")
            .args(["--branch", "main"])
            .arg("/tmp/with space");
        assert_eq!(cmd.to_string(), "git clone --branch main \"/tmp/with space\"");
    }

    #[test]
    fn test_error_message_uses_stderr() {
        let output = CommandOutput::failed(1, "no such file\n");
        assert_eq!(output.error_message(), Some("no such file".to_string()));

        let output = CommandOutput::failed(1, "first\nsecond\n\n");
        assert_eq!(
            output.error_message(),
            Some("first<br>second".to_string())
        );
    }

    #[test]
    fn test_error_message_stderr_on_success_is_failure() {
        let output = CommandOutput {
            status: Some(0),
            stdout: String::new(),
            stderr: "warning: something".to_string(),
        };
        assert_eq!(output.error_message(), Some("warning: something".to_string()));
    }

    #[test]
    fn test_error_message_status_only() {
        assert_eq!(
            CommandOutput::failed(125, "").error_message(),
            Some("exited with status 125".to_string())
        );
        assert_eq!(CommandOutput::ok("abc").error_message(), None);
        assert!(CommandOutput::aborted("").error_message().is_some());
    }

    #[tokio::test]
    async fn test_system_runner_missing_program() {
        let output = SystemRunner
            .run(
                &CommandLine::new("deepscan-definitely-not-a-program"),
                Duration::from_secs(5),
            )
            .await;

        assert!(!output.success());
        assert!(output.status.is_none());
        assert!(output.error_message().unwrap().contains("failed to execute"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_captures_output() {
        let output = SystemRunner
            .run(
                &CommandLine::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]),
                Duration::from_secs(5),
            )
            .await;

        assert_eq!(output.status, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.error_message(), Some("err".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_timeout() {
        let output = SystemRunner
            .run(
                &CommandLine::new("sleep").arg("5"),
                Duration::from_millis(100),
            )
            .await;

        assert!(output.status.is_none());
        assert!(output.stderr.contains("timed out"));
    }
}
