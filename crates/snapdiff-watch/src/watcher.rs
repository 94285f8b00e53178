//! The polling watch loop.

use std::time::Duration;

use chrono::Utc;
use strum::Display;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use snapdiff_core::{DEFAULT_WATCH_INTERVAL_SECS, FilterOptions, ScanConfig, ScanError, Snapshot};
use snapdiff_diff::compute_diff;
use snapdiff_scan::Scanner;

use crate::notification::ChangeNotification;

/// Interval used when none is configured.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(DEFAULT_WATCH_INTERVAL_SECS);

/// Buffered events between the watch task and its consumer.
pub const WATCH_CHANNEL_SIZE: usize = 16;

/// Where the loop currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum WatchState {
    /// Created, nothing scanned yet.
    Idle,
    Scanning,
    Comparing,
    /// A notification has just been handed out.
    Reporting,
    Sleeping,
    /// Cancelled or failed. Terminal.
    Stopped,
}

/// Repeatedly snapshots a directory and reports what changed.
///
/// The loop is pull-based: each call to [`WatchLoop::next_change`] runs as
/// many sleep/scan/compare cycles as it takes to find a change. Only the most
/// recent snapshot is kept between cycles.
pub struct WatchLoop {
    config: ScanConfig,
    interval: Duration,
    cancel: CancellationToken,
    scanner: Scanner,
    state: WatchState,
    previous: Option<Snapshot>,
}

impl WatchLoop {
    /// Watch `root` with the given filter options.
    pub fn new(
        root: impl Into<std::path::PathBuf>,
        options: FilterOptions,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self::with_config(ScanConfig::new(root).with_options(options), interval, cancel)
    }

    /// Watch using a full scan configuration.
    pub fn with_config(config: ScanConfig, interval: Duration, cancel: CancellationToken) -> Self {
        Self {
            config,
            interval,
            cancel,
            scanner: Scanner::new(),
            state: WatchState::Idle,
            previous: None,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The snapshot the next cycle will be compared against.
    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Scanner used for every cycle, for progress subscriptions.
    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Take the initial snapshot if it has not been taken yet.
    ///
    /// Returns `Ok(None)` when the loop is stopped.
    pub async fn start(&mut self) -> Result<Option<&Snapshot>, ScanError> {
        if self.state == WatchState::Idle {
            match self.take_snapshot().await? {
                Some(snapshot) => {
                    info!(
                        root = snapshot.root_directory(),
                        files = snapshot.len(),
                        "Watch baseline taken"
                    );
                    self.previous = Some(snapshot);
                    self.state = WatchState::Sleeping;
                }
                None => return Ok(None),
            }
        }

        if self.state == WatchState::Stopped {
            return Ok(None);
        }
        Ok(self.previous.as_ref())
    }

    /// Wait for the next cycle that finds a change.
    ///
    /// Returns `Ok(None)` once the loop is cancelled, and for every call after
    /// that. A scan failure is returned once; the loop is stopped afterwards.
    pub async fn next_change(&mut self) -> Result<Option<ChangeNotification>, ScanError> {
        if self.start().await?.is_none() {
            return Ok(None);
        }

        loop {
            self.state = WatchState::Sleeping;
            if !self.sleep().await {
                debug!("Watch cancelled while sleeping");
                self.state = WatchState::Stopped;
                return Ok(None);
            }

            let Some(snapshot) = self.take_snapshot().await? else {
                return Ok(None);
            };

            self.state = WatchState::Comparing;
            let notification = self.previous.as_ref().and_then(|previous| {
                let diff = compute_diff(previous, &snapshot, false);
                diff.has_changes()
                    .then(|| ChangeNotification::from_diff(&diff, Utc::now()))
            });
            self.previous = Some(snapshot);

            match notification {
                Some(notification) => {
                    info!(
                        added = notification.added.len(),
                        removed = notification.removed.len(),
                        changed = notification.changed.len(),
                        "Changes detected"
                    );
                    self.state = WatchState::Reporting;
                    return Ok(Some(notification));
                }
                None => debug!("No changes this cycle"),
            }
        }
    }

    /// Stop the loop. Pending and future calls return `Ok(None)`.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        self.state = WatchState::Stopped;
    }

    async fn take_snapshot(&mut self) -> Result<Option<Snapshot>, ScanError> {
        self.state = WatchState::Scanning;

        match self
            .scanner
            .scan_async(self.config.clone(), self.cancel.clone())
            .await
        {
            Ok(report) => {
                if report.has_warnings() {
                    warn!(
                        skipped = report.warnings.len(),
                        "Some files could not be read this cycle"
                    );
                }
                Ok(Some(report.snapshot))
            }
            Err(ScanError::Cancelled) => {
                debug!("Watch cancelled while scanning");
                self.state = WatchState::Stopped;
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Watch scan failed, stopping");
                self.state = WatchState::Stopped;
                Err(e)
            }
        }
    }

    /// Sleep for one interval. Returns `false` if cancelled first.
    async fn sleep(&self) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.interval) => true,
        }
    }
}

/// Events forwarded by [`start_watch`].
#[derive(Debug)]
pub enum WatchEvent {
    /// The baseline snapshot was taken.
    Started { files: usize },
    /// A cycle found changes.
    Changes(ChangeNotification),
    /// A scan failed; no more events follow.
    Failed(ScanError),
}

/// Start a watch loop on the tokio runtime.
///
/// The channel closes when the loop stops, either through `cancel` or after
/// a [`WatchEvent::Failed`].
pub fn start_watch(
    config: ScanConfig,
    interval: Duration,
    cancel: CancellationToken,
) -> mpsc::Receiver<WatchEvent> {
    let (tx, rx) = mpsc::channel(WATCH_CHANNEL_SIZE);

    tokio::spawn(async move {
        watch_impl(WatchLoop::with_config(config, interval, cancel), tx).await;
    });

    rx
}

async fn watch_impl(mut watch: WatchLoop, tx: mpsc::Sender<WatchEvent>) {
    match watch.start().await {
        Ok(Some(snapshot)) => {
            let files = snapshot.len();
            if tx.send(WatchEvent::Started { files }).await.is_err() {
                return;
            }
        }
        Ok(None) => return,
        Err(e) => {
            let _ = tx.send(WatchEvent::Failed(e)).await;
            return;
        }
    }

    loop {
        match watch.next_change().await {
            Ok(Some(notification)) => {
                if tx.send(WatchEvent::Changes(notification)).await.is_err() {
                    debug!("Watch receiver dropped");
                    watch.stop();
                    return;
                }
            }
            Ok(None) => return,
            Err(e) => {
                let _ = tx.send(WatchEvent::Failed(e)).await;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_start_takes_baseline_once() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();

        let mut watch = WatchLoop::new(
            temp.path(),
            FilterOptions::new(),
            Duration::from_millis(10),
            CancellationToken::new(),
        );
        assert_eq!(watch.state(), WatchState::Idle);

        let files = watch.start().await.unwrap().map(Snapshot::len);
        assert_eq!(files, Some(1));
        assert_eq!(watch.state(), WatchState::Sleeping);

        fs::write(temp.path().join("b.txt"), "b").unwrap();
        let files = watch.start().await.unwrap().map(Snapshot::len);
        assert_eq!(files, Some(1));
    }

    #[tokio::test]
    async fn test_stop_is_terminal() {
        let temp = TempDir::new().unwrap();
        let mut watch = WatchLoop::new(
            temp.path(),
            FilterOptions::new(),
            Duration::from_secs(3600),
            CancellationToken::new(),
        );

        watch.start().await.unwrap();
        watch.stop();

        assert!(watch.next_change().await.unwrap().is_none());
        assert_eq!(watch.state(), WatchState::Stopped);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(WatchState::Sleeping.to_string(), "Sleeping");
        assert_eq!(DEFAULT_WATCH_INTERVAL, Duration::from_secs(5));
    }
}
