//! Command execution: the bounded worker pool and the per-task runner.

mod dispatcher;
mod runner;

pub use dispatcher::{DispatchSummary, Dispatcher, CHANNEL_CAPACITY};
pub use runner::CommandRunner;
