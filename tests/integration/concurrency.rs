//! Concurrency budget enforcement.
//!
//! These assertions are timing-based: each run sleeps a fixed duration, so
//! the wall-clock time of the whole pass reveals how many ran in parallel.

use fanrun::testing::CollectingSink;
use fanrun::{CommandRunner, CommandSpec, Dispatcher, PathSource};
use std::time::{Duration, Instant};
use tempfile::tempdir;

use crate::common::make_files;

fn sleeping_dispatcher(seconds: &str, budget: usize) -> Dispatcher {
    let spec = CommandSpec::new("sh", vec!["-c".into(), format!("sleep {seconds}")]);
    Dispatcher::new(CommandRunner::new(spec, false), budget)
}

#[tokio::test]
async fn test_budget_two_runs_in_two_waves() {
    let dir = tempdir().unwrap();
    let paths = make_files(dir.path(), 4);

    let (sink, _units) = CollectingSink::new();
    let start = Instant::now();
    let summary = sleeping_dispatcher("0.2", 2)
        .dispatch(PathSource::flat(paths), Box::new(sink))
        .await;
    let elapsed = start.elapsed();

    assert_eq!(summary.succeeded, 4);
    // 4 runs of 200ms at budget 2: two waves, ~400ms. Not ~200ms
    // (budget exceeded) and not ~800ms (budget never reached).
    assert!(
        elapsed >= Duration::from_millis(380),
        "finished too fast: {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_millis(780),
        "took too long: {elapsed:?}"
    );
}

#[tokio::test]
async fn test_budget_one_serializes_runs() {
    let dir = tempdir().unwrap();
    let paths = make_files(dir.path(), 3);

    let (sink, _units) = CollectingSink::new();
    let start = Instant::now();
    let summary = sleeping_dispatcher("0.1", 1)
        .dispatch(PathSource::flat(paths), Box::new(sink))
        .await;
    let elapsed = start.elapsed();

    assert_eq!(summary.succeeded, 3);
    assert!(
        elapsed >= Duration::from_millis(290),
        "budget 1 overlapped runs: {elapsed:?}"
    );
}

#[tokio::test]
async fn test_generous_budget_overlaps_runs() {
    let dir = tempdir().unwrap();
    let paths = make_files(dir.path(), 4);

    let (sink, _units) = CollectingSink::new();
    let start = Instant::now();
    let summary = sleeping_dispatcher("0.2", 4)
        .dispatch(PathSource::flat(paths), Box::new(sink))
        .await;
    let elapsed = start.elapsed();

    assert_eq!(summary.succeeded, 4);
    // All four overlap: well under the 800ms a serial pass would take.
    assert!(
        elapsed < Duration::from_millis(600),
        "runs did not overlap: {elapsed:?}"
    );
}
