//! Output serialization.
//!
//! Every unit of output flows through a single writer task, so one run's
//! text never interleaves with another's. The writer finishes only after
//! every sender has been dropped and everything it accepted has been
//! flushed; awaiting its handle is the drain acknowledgement the shutdown
//! protocol requires, so the process must not exit before it resolves.

use async_trait::async_trait;
use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter, Stdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Destination for serialized output units.
///
/// Implementations are driven by the single writer task and never called
/// concurrently, so a unit's lines always land together.
#[async_trait]
pub trait OutputSink: Send {
    /// Write one atomic unit. A trailing newline is appended if the unit
    /// does not already end with one.
    async fn write_unit(&mut self, unit: &str) -> io::Result<()>;

    /// Flush buffered output.
    async fn flush(&mut self) -> io::Result<()>;
}

/// Writes units to standard output.
pub struct StdoutSink {
    out: BufWriter<Stdout>,
}

impl StdoutSink {
    /// Create a sink over the process's standard output.
    pub fn new() -> Self {
        Self {
            out: BufWriter::new(tokio::io::stdout()),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputSink for StdoutSink {
    async fn write_unit(&mut self, unit: &str) -> io::Result<()> {
        self.out.write_all(unit.as_bytes()).await?;
        if !unit.ends_with('\n') {
            self.out.write_all(b"\n").await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.out.flush().await
    }
}

/// Appends timestamped lines to a log file.
pub struct LogFileSink {
    file: BufWriter<File>,
    path: PathBuf,
}

impl LogFileSink {
    /// Open the given log file for appending, creating it if needed.
    pub async fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            file: BufWriter::new(file),
            path,
        })
    }

    /// Open the log file next to the current executable, named `<exe>.log`.
    pub async fn beside_executable() -> io::Result<Self> {
        let path = std::env::current_exe()?.with_extension("log");
        Self::open(path).await
    }

    /// Where this sink writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OutputSink for LogFileSink {
    async fn write_unit(&mut self, unit: &str) -> io::Result<()> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        for line in unit.lines() {
            self.file
                .write_all(format!("{stamp} {line}\n").as_bytes())
                .await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.file.flush().await
    }
}

/// Spawn the single writer task.
///
/// Units are written one at a time in arrival order. A write error is
/// logged and draining continues, so a bad unit cannot wedge the pipeline.
/// The task ends when every sender has been dropped (the "all producers
/// done" signal), then flushes and returns the number of units written.
pub fn spawn_writer(
    mut sink: Box<dyn OutputSink>,
    mut rx: mpsc::Receiver<String>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut written = 0u64;
        while let Some(unit) = rx.recv().await {
            match sink.write_unit(&unit).await {
                Ok(()) => written += 1,
                Err(error) => warn!(%error, "failed to write output unit"),
            }
        }
        if let Err(error) = sink.flush().await {
            warn!(%error, "failed to flush sink");
        }
        written
    })
}
