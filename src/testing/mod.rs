//! Testing utilities for exercising the dispatch pipeline.
//!
//! [`CollectingSink`] stands in for a real output destination: it records
//! every accepted unit in a shared buffer, optionally sleeping before each
//! write to simulate a slow consumer. Used by this crate's own tests and
//! available to integration tests.

use async_trait::async_trait;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::sink::OutputSink;

/// Shared buffer of units a [`CollectingSink`] has written.
pub type UnitBuffer = Arc<Mutex<Vec<String>>>;

/// An [`OutputSink`] that records units instead of writing them anywhere.
pub struct CollectingSink {
    units: UnitBuffer,
    delay: Option<Duration>,
}

impl CollectingSink {
    /// A sink that records units immediately. Returns the sink and the
    /// buffer to inspect after the pipeline finishes.
    pub fn new() -> (Self, UnitBuffer) {
        let units: UnitBuffer = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                units: Arc::clone(&units),
                delay: None,
            },
            units,
        )
    }

    /// A sink that sleeps before accepting each unit, simulating a slow
    /// consumer. Output must still drain completely before dispatch
    /// reports done.
    pub fn with_delay(delay: Duration) -> (Self, UnitBuffer) {
        let units: UnitBuffer = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                units: Arc::clone(&units),
                delay: Some(delay),
            },
            units,
        )
    }
}

#[async_trait]
impl OutputSink for CollectingSink {
    async fn write_unit(&mut self, unit: &str) -> io::Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.units.lock().unwrap().push(unit.to_string());
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
