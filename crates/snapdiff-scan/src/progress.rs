//! Scan progress reporting and per-pass counters.

use std::time::{Duration, Instant};

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Files added to the snapshot so far.
    pub files_tracked: u64,
    /// Files dropped by include/exclude patterns so far.
    pub files_filtered: u64,
    /// Files skipped because of a per-file fault so far.
    pub files_failed: u64,
    /// Total bytes of tracked files so far.
    pub bytes_tracked: u64,
    /// Relative path of the file just processed.
    pub current_path: String,
    /// Time elapsed since the scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Files seen so far, whatever happened to them.
    pub fn files_seen(&self) -> u64 {
        self.files_tracked + self.files_filtered + self.files_failed
    }

    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_seen() as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Totals for one finished snapshot pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Files recorded in the snapshot.
    pub files_tracked: u64,
    /// Files left out by include/exclude patterns.
    pub files_filtered: u64,
    /// Files left out because of access or I/O errors.
    pub files_failed: u64,
    /// Sum of tracked file sizes.
    pub bytes_tracked: u64,
    /// Wall-clock duration of the pass.
    pub duration: Duration,
}

impl ScanStats {
    /// Files that did not make it into the snapshot.
    pub fn skipped(&self) -> u64 {
        self.files_filtered + self.files_failed
    }
}

/// Internal progress tracker with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    stats: ScanStats,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            stats: ScanStats::default(),
        }
    }

    pub fn record_file(&mut self, size: u64) {
        self.stats.files_tracked += 1;
        self.stats.bytes_tracked += size;
    }

    pub fn record_filtered(&mut self) {
        self.stats.files_filtered += 1;
    }

    pub fn record_fault(&mut self) {
        self.stats.files_failed += 1;
    }

    pub fn snapshot(&self, current_path: &str) -> ScanProgress {
        ScanProgress {
            files_tracked: self.stats.files_tracked,
            files_filtered: self.stats.files_filtered,
            files_failed: self.stats.files_failed,
            bytes_tracked: self.stats.bytes_tracked,
            current_path: current_path.to_string(),
            elapsed: self.start_time.elapsed(),
        }
    }

    pub fn finish(self) -> ScanStats {
        ScanStats {
            duration: self.start_time.elapsed(),
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_counts() {
        let mut tracker = ProgressTracker::new();
        tracker.record_file(100);
        tracker.record_file(50);
        tracker.record_filtered();
        tracker.record_fault();

        let progress = tracker.snapshot("a.txt");
        assert_eq!(progress.files_seen(), 4);
        assert_eq!(progress.bytes_tracked, 150);
        assert_eq!(progress.current_path, "a.txt");

        let stats = tracker.finish();
        assert_eq!(stats.files_tracked, 2);
        assert_eq!(stats.skipped(), 2);
    }
}
