use std::fs;
use std::time::Duration;

use snapdiff_core::{FilterOptions, ScanConfig, ScanError};
use snapdiff_watch::{WatchEvent, WatchLoop, WatchState, start_watch};
use tempfile::TempDir;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_millis(20);
const LIMIT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn test_reports_added_changed_and_removed() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("keep.txt"), "one").unwrap();
    fs::write(temp.path().join("drop.txt"), "bye").unwrap();

    let mut watch = WatchLoop::new(
        temp.path(),
        FilterOptions::new(),
        TICK,
        CancellationToken::new(),
    );
    watch.start().await.unwrap();

    fs::write(temp.path().join("keep.txt"), "one two").unwrap();
    fs::write(temp.path().join("new.txt"), "hi").unwrap();
    fs::remove_file(temp.path().join("drop.txt")).unwrap();

    let change = timeout(LIMIT, watch.next_change())
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(change.added, vec!["new.txt"]);
    assert_eq!(change.removed, vec!["drop.txt"]);
    assert_eq!(change.changed, vec!["keep.txt"]);
    assert_eq!(watch.state(), WatchState::Reporting);
    assert_eq!(watch.previous().map(|s| s.len()), Some(2));
}

#[tokio::test]
async fn test_quiet_directory_reports_nothing_until_cancelled() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "a").unwrap();

    let cancel = CancellationToken::new();
    let mut watch = WatchLoop::new(temp.path(), FilterOptions::new(), TICK, cancel.clone());

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(TICK * 5).await;
        canceller.cancel();
    });

    let result = timeout(LIMIT, watch.next_change()).await.unwrap();
    assert!(matches!(result, Ok(None)));
    assert_eq!(watch.state(), WatchState::Stopped);
    assert!(watch.next_change().await.unwrap().is_none());
}

#[tokio::test]
async fn test_excluded_paths_never_reported() {
    let temp = TempDir::new().unwrap();
    let options = FilterOptions::new().exclude("*.tmp");
    let mut watch = WatchLoop::new(temp.path(), options, TICK, CancellationToken::new());
    watch.start().await.unwrap();

    fs::write(temp.path().join("scratch.tmp"), "x").unwrap();
    fs::write(temp.path().join("real.txt"), "y").unwrap();

    let change = timeout(LIMIT, watch.next_change())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(change.added, vec!["real.txt"]);
}

#[tokio::test]
async fn test_deleted_root_fails_once() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("watched");
    fs::create_dir(&root).unwrap();

    let mut watch = WatchLoop::new(&root, FilterOptions::new(), TICK, CancellationToken::new());
    watch.start().await.unwrap();
    fs::remove_dir(&root).unwrap();

    let result = timeout(LIMIT, watch.next_change()).await.unwrap();
    assert!(matches!(result, Err(ScanError::NotFound { .. })));
    assert_eq!(watch.state(), WatchState::Stopped);
    assert!(watch.next_change().await.unwrap().is_none());
}

#[tokio::test]
async fn test_start_watch_channel() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "a").unwrap();

    let cancel = CancellationToken::new();
    let mut rx = start_watch(ScanConfig::new(temp.path()), TICK, cancel.clone());

    let first = timeout(LIMIT, rx.recv()).await.unwrap();
    assert!(matches!(first, Some(WatchEvent::Started { files: 1 })));

    fs::write(temp.path().join("b.txt"), "b").unwrap();
    match timeout(LIMIT, rx.recv()).await.unwrap() {
        Some(WatchEvent::Changes(change)) => assert_eq!(change.added, vec!["b.txt"]),
        other => panic!("unexpected event: {other:?}"),
    }

    cancel.cancel();
    assert!(timeout(LIMIT, rx.recv()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_start_watch_missing_root() {
    let temp = TempDir::new().unwrap();
    let mut rx = start_watch(
        ScanConfig::new(temp.path().join("missing")),
        TICK,
        CancellationToken::new(),
    );

    assert!(matches!(
        timeout(LIMIT, rx.recv()).await.unwrap(),
        Some(WatchEvent::Failed(ScanError::NotFound { .. }))
    ));
    assert!(timeout(LIMIT, rx.recv()).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_during_baseline_scan_stops() {
    let temp = TempDir::new().unwrap();
    let chunk = vec![3u8; 64 * 1024];
    for i in 0..400 {
        fs::write(temp.path().join(format!("file{i:04}.bin")), &chunk).unwrap();
    }

    let cancel = CancellationToken::new();
    let mut watch = WatchLoop::new(temp.path(), FilterOptions::new(), TICK, cancel.clone());

    let mut progress_rx = watch.scanner().subscribe();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        if let Err(tokio::sync::broadcast::error::RecvError::Closed) = progress_rx.recv().await {
            return;
        }
        canceller.cancel();
    });

    let baseline = timeout(LIMIT, watch.start()).await.unwrap();
    assert!(matches!(baseline, Ok(None)));
    assert_eq!(watch.state(), WatchState::Stopped);
    assert!(watch.previous().is_none());

    let next = timeout(LIMIT, watch.next_change()).await.unwrap();
    assert!(matches!(next, Ok(None)));
}
