//! Single command invocation.
//!
//! [`CommandRunner`] wraps one external command run for one task: it builds
//! the argument list, spawns the process, captures both output streams,
//! decodes them from Shift-JIS, and classifies the outcome. Exactly one
//! attempt per task; there are no retries, timeouts, or cancellation.

use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

use crate::core::encoding::decode_shift_jis;
use crate::core::types::{CommandSpec, ExecutionResult, RunError, Task};

/// Runs the shared command once per task.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    spec: Arc<CommandSpec>,
    cwd_mode: bool,
}

impl CommandRunner {
    /// Create a runner for the given spec. With `cwd_mode`, each task's
    /// path becomes the subprocess working directory instead of a trailing
    /// argument.
    pub fn new(spec: CommandSpec, cwd_mode: bool) -> Self {
        Self {
            spec: Arc::new(spec),
            cwd_mode,
        }
    }

    /// The command this runner executes.
    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Execute the command for one task.
    ///
    /// Failures are captured in the returned result, never propagated: a
    /// non-zero exit or a spawn error affects only this task.
    pub async fn run(&self, task: &Task) -> ExecutionResult {
        let mut cmd = Command::new(self.spec.program());
        cmd.args(self.spec.args());
        if self.cwd_mode {
            // The working directory is set per spawn; the process-wide
            // current directory is never touched.
            cmd.current_dir(task.path());
        } else {
            cmd.arg(task.path());
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!(path = %task.path().display(), program = self.spec.program(), "spawning");

        match cmd.output().await {
            Ok(output) => {
                let mut text = decode_shift_jis(&output.stdout);
                let stderr = decode_shift_jis(&output.stderr);
                if !stderr.is_empty() {
                    if !text.is_empty() && !text.ends_with('\n') {
                        text.push('\n');
                    }
                    text.push_str(&stderr);
                }
                if output.status.success() {
                    ExecutionResult::success(task.clone(), text)
                } else {
                    let code = output.status.code().unwrap_or(-1);
                    ExecutionResult::failure(task.clone(), text, RunError::ExitStatus(code))
                }
            }
            Err(error) => ExecutionResult::failure(
                task.clone(),
                String::new(),
                RunError::Spawn(error.to_string()),
            ),
        }
    }
}
