//! End-to-end dispatch scenarios.

use fanrun::testing::CollectingSink;
use fanrun::{config, CommandRunner, CommandSpec, Dispatcher, PathFilter, PathSource};
use std::collections::HashSet;
use std::fs;
use tempfile::tempdir;

use crate::common::{done_paths, make_files, start_paths, touch};

fn dispatcher(program: &str, args: &[&str], budget: usize) -> Dispatcher {
    let spec = CommandSpec::new(program, args.iter().map(|a| a.to_string()).collect());
    Dispatcher::new(CommandRunner::new(spec, false), budget)
}

#[tokio::test]
async fn test_flat_dispatch_runs_command_once_per_path() {
    let dir = tempdir().unwrap();
    let paths = make_files(dir.path(), 3);

    let (sink, units) = CollectingSink::new();
    let summary = dispatcher("echo", &["seen"], 2)
        .dispatch(PathSource::flat(paths.clone()), Box::new(sink))
        .await;

    assert_eq!(summary.launched, 3);
    assert_eq!(summary.succeeded, 3);
    assert!(summary.all_succeeded());

    let units = units.lock().unwrap();
    let expected: HashSet<String> = paths
        .iter()
        .map(|p| p.canonicalize().unwrap().display().to_string())
        .collect();
    let done: HashSet<String> = done_paths(&units).into_iter().collect();
    assert_eq!(done, expected);
    let started: HashSet<String> = start_paths(&units).into_iter().collect();
    assert_eq!(started, expected);
}

#[tokio::test]
async fn test_recursive_dispatch_with_extension_filter() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.png");
    touch(dir.path(), "b.txt");
    touch(dir.path(), "c.JPG");
    fs::create_dir(dir.path().join("nested")).unwrap();
    touch(&dir.path().join("nested"), "d.png");

    let filter = PathFilter::with_extensions(config::parse_extensions("png,jpg").unwrap());
    let source = PathSource::recursive(vec![dir.path().into()], filter);

    let (sink, units) = CollectingSink::new();
    let summary = dispatcher("echo", &[], 2)
        .dispatch(source, Box::new(sink))
        .await;

    assert_eq!(summary.launched, 3);

    let units = units.lock().unwrap();
    let done: HashSet<String> = done_paths(&units).into_iter().collect();
    let expected: HashSet<String> = ["a.png", "c.JPG", "nested/d.png"]
        .iter()
        .map(|name| dir.path().join(name).display().to_string())
        .collect();
    assert_eq!(done, expected);
}

#[tokio::test]
async fn test_failed_runs_report_output_and_error() {
    let dir = tempdir().unwrap();
    let paths = make_files(dir.path(), 2);

    let (sink, units) = CollectingSink::new();
    let summary = dispatcher("sh", &["-c", "echo partial; exit 5"], 2)
        .dispatch(PathSource::flat(paths), Box::new(sink))
        .await;

    // Failures are surfaced per run; dispatch itself still completes and
    // drains everything.
    assert_eq!(summary.launched, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.succeeded, 0);

    let units = units.lock().unwrap();
    assert_eq!(done_paths(&units).len(), 2);
    for unit in units.iter().filter(|u| u.contains("\ndone ")) {
        assert!(unit.contains("partial"), "captured stdout lost: {unit}");
        assert!(
            unit.contains("command exited with code 5"),
            "error indicator missing: {unit}"
        );
    }
}

#[tokio::test]
async fn test_directory_cwd_mode_runs_inside_each_directory() {
    let root = tempdir().unwrap();
    let base = root.path().canonicalize().unwrap();
    fs::create_dir(base.join("x")).unwrap();
    fs::create_dir(base.join("z")).unwrap();

    let spec = CommandSpec::new("pwd", vec![]);
    let dispatcher = Dispatcher::new(CommandRunner::new(spec, true), 2);
    let source = PathSource::recursive(vec![base.clone()], PathFilter::Directories);

    let (sink, units) = CollectingSink::new();
    let summary = dispatcher.dispatch(source, Box::new(sink)).await;

    // Root, x, and z each get one run whose pwd output is the directory
    // itself.
    assert_eq!(summary.launched, 3);
    assert_eq!(summary.succeeded, 3);

    let units = units.lock().unwrap();
    for dir in [base.clone(), base.join("x"), base.join("z")] {
        let line = format!(": {}", dir.display());
        assert!(
            units
                .iter()
                .any(|u| u.contains("\ndone ") && u.lines().next().unwrap().ends_with(&line)),
            "no pwd output for {}",
            dir.display()
        );
    }
}

#[tokio::test]
async fn test_rerun_over_static_tree_yields_same_task_set() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.txt");
    touch(dir.path(), "b.txt");
    fs::create_dir(dir.path().join("sub")).unwrap();
    touch(&dir.path().join("sub"), "c.txt");

    let mut sets = Vec::new();
    for _ in 0..2 {
        let source = PathSource::recursive(vec![dir.path().into()], PathFilter::all_files());
        let (sink, units) = CollectingSink::new();
        dispatcher("echo", &[], 2).dispatch(source, Box::new(sink)).await;
        let units = units.lock().unwrap();
        sets.push(done_paths(&units).into_iter().collect::<HashSet<String>>());
    }
    assert_eq!(sets[0], sets[1]);
    assert_eq!(sets[0].len(), 3);
}
