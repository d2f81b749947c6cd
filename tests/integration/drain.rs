//! Shutdown ordering: everything accepted by the sink is written before
//! dispatch reports done, even when the sink is much slower than the pool.

use fanrun::testing::CollectingSink;
use fanrun::{CommandRunner, CommandSpec, Dispatcher, PathSource};
use std::collections::HashSet;
use std::time::Duration;
use tempfile::tempdir;

use crate::common::{done_paths, make_files, start_paths};

#[tokio::test]
async fn test_no_output_lost_with_slow_sink_and_many_tasks() {
    let dir = tempdir().unwrap();
    let paths = make_files(dir.path(), 120);

    // One millisecond per unit: the writer lags the pool by design.
    let (sink, units) = CollectingSink::with_delay(Duration::from_millis(1));
    let spec = CommandSpec::new("true", vec![]);
    let dispatcher = Dispatcher::new(CommandRunner::new(spec, false), 8);

    let summary = dispatcher
        .dispatch(PathSource::flat(paths.clone()), Box::new(sink))
        .await;

    assert_eq!(summary.launched, 120);
    assert_eq!(summary.succeeded, 120);

    // Dispatch has returned, so the sink must already hold every unit: one
    // start marker and one result unit per task, nothing dropped at exit.
    let units = units.lock().unwrap();
    assert_eq!(units.len(), 240);
    assert_eq!(start_paths(&units).len(), 120);

    let done: HashSet<String> = done_paths(&units).into_iter().collect();
    assert_eq!(done.len(), 120);
    for path in &paths {
        let canonical = path.canonicalize().unwrap().display().to_string();
        assert!(done.contains(&canonical), "missing result for {canonical}");
    }
}

#[tokio::test]
async fn test_failures_do_not_leak_output_either() {
    let dir = tempdir().unwrap();
    let paths = make_files(dir.path(), 30);

    let (sink, units) = CollectingSink::with_delay(Duration::from_millis(1));
    let spec = CommandSpec::new("sh", vec!["-c".into(), "echo boom; exit 1".into()]);
    let dispatcher = Dispatcher::new(CommandRunner::new(spec, false), 4);

    let summary = dispatcher
        .dispatch(PathSource::flat(paths), Box::new(sink))
        .await;

    assert_eq!(summary.failed, 30);

    let units = units.lock().unwrap();
    assert_eq!(done_paths(&units).len(), 30);
    assert!(units
        .iter()
        .filter(|u| u.contains("\ndone "))
        .all(|u| u.contains("boom") && u.contains("command exited with code 1")));
}
