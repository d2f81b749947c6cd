//! Path discovery: the producer end of the pipeline.
//!
//! [`PathSource`] enumerates the work set (an explicit list of paths, or a
//! recursive walk of root directories) and feeds it into the
//! bounded task channel. The bounded channel is the backpressure mechanism:
//! once the worker pool is saturated the producer blocks, so enumeration
//! never races ahead of execution by more than the channel capacity.
//!
//! Enumeration errors are never fatal: an unresolvable path or a failed
//! directory entry is logged and skipped while the rest of the work set
//! proceeds.

use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::filter::PathFilter;
use crate::core::types::Task;

/// How the work set is enumerated.
#[derive(Debug, Clone)]
enum SourceMode {
    /// The given paths are the work set, emitted in input order.
    Flat,
    /// Each path is a root for a pre-order recursive walk; entries that
    /// pass the filter become tasks.
    Recursive { filter: PathFilter },
}

/// Enumerates tasks into the pipeline exactly once, in traversal order.
#[derive(Debug)]
pub struct PathSource {
    roots: Vec<PathBuf>,
    mode: SourceMode,
}

impl PathSource {
    /// A source that emits the given paths directly, validating that each
    /// resolves to an existing absolute path.
    pub fn flat(paths: Vec<PathBuf>) -> Self {
        Self {
            roots: paths,
            mode: SourceMode::Flat,
        }
    }

    /// A source that walks each root depth-first in pre-order (entries
    /// sorted by file name, so traversal of a static tree is
    /// deterministic) and emits entries that pass the filter.
    pub fn recursive(roots: Vec<PathBuf>, filter: PathFilter) -> Self {
        Self {
            roots,
            mode: SourceMode::Recursive { filter },
        }
    }

    /// Run enumeration on a blocking task, emitting tasks into `tx`.
    ///
    /// The sender is dropped when enumeration finishes; the closed channel
    /// is the "no more tasks" signal the dispatcher drains on. Returns the
    /// number of tasks emitted.
    pub fn spawn(self, tx: mpsc::Sender<Task>) -> JoinHandle<usize> {
        tokio::task::spawn_blocking(move || self.produce(&tx))
    }

    fn produce(self, tx: &mpsc::Sender<Task>) -> usize {
        let emitted = match &self.mode {
            SourceMode::Flat => Self::emit_flat(&self.roots, tx),
            SourceMode::Recursive { filter } => Self::emit_walk(&self.roots, filter, tx),
        };
        debug!(emitted, "path enumeration finished");
        emitted
    }

    fn emit_flat(paths: &[PathBuf], tx: &mpsc::Sender<Task>) -> usize {
        let mut emitted = 0;
        for path in paths {
            match std::fs::canonicalize(path) {
                Ok(absolute) => {
                    if tx.blocking_send(Task::new(absolute)).is_err() {
                        return emitted;
                    }
                    emitted += 1;
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping unresolvable path");
                }
            }
        }
        emitted
    }

    fn emit_walk(roots: &[PathBuf], filter: &PathFilter, tx: &mpsc::Sender<Task>) -> usize {
        let mut emitted = 0;
        for root in roots {
            for entry in WalkDir::new(root).sort_by_file_name() {
                match entry {
                    Ok(entry) => {
                        if filter.qualifies(entry.path(), entry.file_type().is_dir()) {
                            if tx.blocking_send(Task::new(entry.path())).is_err() {
                                return emitted;
                            }
                            emitted += 1;
                        }
                    }
                    Err(error) => {
                        // Permission denied and friends: keep walking the
                        // rest of this root and the remaining roots.
                        warn!(root = %root.display(), %error, "traversal error");
                    }
                }
            }
        }
        emitted
    }
}
