//! Core value types for the dispatch pipeline.
//!
//! These types are created once per pipeline pass and flow through the
//! channels connecting the producer, the worker pool, and the sink. The
//! shared [`CommandSpec`] is fixed after startup and never mutated.

use chrono::Local;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One unit of work: a single path the command will be run against.
///
/// Created by the path source, consumed exactly once by exactly one worker,
/// and discarded when its run finishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    path: PathBuf,
}

impl Task {
    /// Create a task for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this task runs against.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Basename used to prefix this task's output lines.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Consume the task, returning its path.
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

impl From<PathBuf> for Task {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

/// The external command shared by every worker.
///
/// Read-only after startup; workers share it behind an `Arc` and build a
/// fresh argument list per task, so no per-task state ever leaks between
/// runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Create a spec from an executable name and its fixed argument list.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The executable to run.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The fixed arguments passed before any per-task path.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Why a single run failed.
///
/// A failure is scoped to its own task: it is reported through the sink and
/// never propagates to siblings or to the process exit code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunError {
    /// The command ran but exited non-zero (-1 when killed by a signal).
    #[error("command exited with code {0}")]
    ExitStatus(i32),

    /// The command could not be started at all.
    #[error("failed to spawn command: {0}")]
    Spawn(String),
}

/// Captured outcome of one command run.
///
/// An error does not imply empty output: whatever the command wrote before
/// failing is preserved and reported alongside the error.
#[derive(Debug)]
pub struct ExecutionResult {
    task: Task,
    output: String,
    error: Option<RunError>,
}

impl ExecutionResult {
    /// Result for a run that exited successfully.
    pub fn success(task: Task, output: String) -> Self {
        Self {
            task,
            output,
            error: None,
        }
    }

    /// Result for a run that failed, keeping any captured output.
    pub fn failure(task: Task, output: String, error: RunError) -> Self {
        Self {
            task,
            output,
            error: Some(error),
        }
    }

    /// The task this result belongs to.
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// The decoded output the command produced.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// The error, if the run failed.
    pub fn error(&self) -> Option<&RunError> {
        self.error.as_ref()
    }

    /// Whether the run succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Render this result as one atomic output unit.
    ///
    /// The unit's lines are handed to the sink together, so they can never
    /// interleave with another run's unit. The trailing `done` marker pairs
    /// with the `start` marker emitted when the run began.
    pub fn render(&self) -> String {
        let prefix = self.task.display_name();
        let mut unit = format!("{}: {}", prefix, self.output);
        if !unit.ends_with('\n') {
            unit.push('\n');
        }
        if let Some(error) = &self.error {
            unit.push_str(&format!("{}: {}\n", prefix, error));
        }
        unit.push_str(&format!(
            "done {}: {}",
            Local::now().format("%H:%M:%S"),
            self.task.path().display()
        ));
        unit
    }
}
