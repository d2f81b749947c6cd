//! The bounded-concurrency core.
//!
//! The dispatcher consumes tasks from the producer channel and spawns one
//! short-lived execution per task, gated by a semaphore so at most `budget`
//! runs are ever in flight. Producer exhaustion and worker completion are
//! decoupled, so shutdown is an explicit three-stage join: drain the task
//! channel, join every spawned execution, then drop the output sender and
//! await the sink writer.

use chrono::Local;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info_span, Instrument};

use crate::core::types::Task;
use crate::sink::{self, OutputSink};
use crate::source::PathSource;

use super::runner::CommandRunner;

/// Capacity of the task and output channels. Bounded so a stalled consumer
/// applies backpressure to the producer instead of buffering without limit.
pub const CHANNEL_CAPACITY: usize = 100;

/// Outcome counts for one dispatch pass.
///
/// Failures are reported here and in the output stream, never in the
/// process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Tasks received from the source and launched.
    pub launched: usize,
    /// Runs that exited successfully.
    pub succeeded: usize,
    /// Runs that exited non-zero, failed to spawn, or panicked.
    pub failed: usize,
}

impl DispatchSummary {
    /// Whether every launched run succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Semaphore-gated spawn-per-task worker pool.
pub struct Dispatcher {
    runner: Arc<CommandRunner>,
    semaphore: Arc<Semaphore>,
    budget: usize,
}

impl Dispatcher {
    /// Create a dispatcher with the given concurrency budget.
    pub fn new(runner: CommandRunner, budget: usize) -> Self {
        Self {
            runner: Arc::new(runner),
            semaphore: Arc::new(Semaphore::new(budget)),
            budget,
        }
    }

    /// The concurrency budget.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Run the full pipeline: enumerate paths, execute the command for each
    /// with at most `budget` runs in flight, and drain the sink before
    /// returning.
    ///
    /// By the time this returns, every enumerated task has been executed
    /// exactly once and every accepted output unit has been written.
    pub async fn dispatch(&self, source: PathSource, out: Box<dyn OutputSink>) -> DispatchSummary {
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (unit_tx, unit_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let writer = sink::spawn_writer(out, unit_rx);
        let producer = source.spawn(task_tx);

        let summary = self
            .run_pool(task_rx, unit_tx)
            .instrument(info_span!("dispatch", budget = self.budget))
            .await;

        match producer.await {
            Ok(emitted) => debug!(emitted, "producer finished"),
            Err(join_error) => error!(error = %join_error, "producer task failed"),
        }

        // Every execution has completed and every output sender is gone;
        // awaiting the writer is the drain acknowledgement.
        match writer.await {
            Ok(written) => debug!(written, "sink drained"),
            Err(join_error) => error!(error = %join_error, "sink writer task failed"),
        }

        summary
    }

    /// Consume tasks until the channel closes, then join every launched
    /// execution. Takes the output sender by value so that when this
    /// returns, no sender remains and the writer can finish.
    async fn run_pool(
        &self,
        mut tasks: mpsc::Receiver<Task>,
        units: mpsc::Sender<String>,
    ) -> DispatchSummary {
        let mut pool: JoinSet<bool> = JoinSet::new();
        let mut launched = 0;

        while let Some(task) = tasks.recv().await {
            // Blocks while `budget` runs are in flight; the task channel
            // fills behind us and the producer stalls.
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .expect("semaphore closed");
            launched += 1;

            let runner = Arc::clone(&self.runner);
            let units = units.clone();
            pool.spawn(async move {
                let _permit = permit;
                let start = format!(
                    "start {}: {}",
                    Local::now().format("%H:%M:%S"),
                    task.path().display()
                );
                let _ = units.send(start).await;

                let result = runner.run(&task).await;
                let succeeded = result.is_success();
                let _ = units.send(result.render()).await;
                succeeded
            });
        }
        drop(units);

        let mut succeeded = 0;
        let mut failed = 0;
        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok(true) => succeeded += 1,
                Ok(false) => failed += 1,
                Err(join_error) => {
                    // A panicked worker counts as a failed run; siblings
                    // are unaffected.
                    error!(error = %join_error, "worker task failed");
                    failed += 1;
                }
            }
        }

        DispatchSummary {
            launched,
            succeeded,
            failed,
        }
    }
}
