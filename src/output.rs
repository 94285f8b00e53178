//! Plain-text output for the command line.

use std::path::Path;

use chrono::Local;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

use snapdiff_diff::{DiffResult, format_bytes, format_signed_bytes, format_size_diff};
use snapdiff_scan::{ScanProgress, ScanReport};
use snapdiff_watch::ChangeNotification;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Unchanged files listed before the rest are summarized.
const UNCHANGED_PREVIEW: usize = 10;

fn rule() {
    println!("{}", "─".repeat(60));
}

/// Feed every progress update to `emit` until the scanner is dropped.
///
/// Updates the channel overwrote while the printer was behind are skipped.
/// Returns how many updates were emitted.
pub async fn drain_progress(
    mut progress_rx: broadcast::Receiver<ScanProgress>,
    mut emit: impl FnMut(&ScanProgress),
) -> u64 {
    let mut emitted = 0;
    loop {
        match progress_rx.recv().await {
            Ok(update) => {
                emit(&update);
                emitted += 1;
            }
            Err(RecvError::Lagged(missed)) => debug!(missed, "Progress printer fell behind"),
            Err(RecvError::Closed) => return emitted,
        }
    }
}

/// Summary printed after a snapshot is written.
pub fn print_snapshot_summary(report: &ScanReport, output: &Path) {
    println!();
    println!(" Snapshot written to: {}", output.display());
    println!("   Files tracked : {}", report.stats.files_tracked);
    println!("   Files skipped : {}", report.stats.skipped());
    println!(
        "   Total size    : {}",
        format_bytes(report.snapshot.total_size())
    );
    println!(
        "   Scanned in    : {:.2}s",
        report.stats.duration.as_secs_f64()
    );

    if report.has_warnings() {
        println!();
        println!("{} file(s) could not be read:", report.warnings.len());
        for warning in &report.warnings {
            println!("   {}", warning.message);
        }
    }
}

/// Full diff report.
pub fn print_diff(
    diff: &DiffResult<'_>,
    old_label: &str,
    new_label: &str,
    detailed: bool,
) {
    println!();
    rule();
    println!(" snapdiff report");
    rule();
    println!();
    println!("Old: {old_label}");
    println!(
        "     {} UTC",
        diff.old_snapshot.created_at().format(TIME_FORMAT)
    );
    println!("New: {new_label}");
    println!(
        "     {} UTC",
        diff.new_snapshot.created_at().format(TIME_FORMAT)
    );
    println!();

    println!(" Summary:");
    println!("   Added   : {} files", diff.added.len());
    println!("   Removed : {} files", diff.removed.len());
    println!("   Changed : {} files", diff.changed.len());
    println!();

    if !diff.added.is_empty() {
        println!(" Added Files ({}):", diff.added.len());
        for file in &diff.added {
            if detailed {
                println!(
                    "   + {} ({})",
                    file.relative_path(),
                    format_bytes(file.length())
                );
            } else {
                println!("   + {}", file.relative_path());
            }
        }
        println!();
    }

    if !diff.removed.is_empty() {
        println!(" Removed Files ({}):", diff.removed.len());
        for file in &diff.removed {
            if detailed {
                println!(
                    "   - {} ({})",
                    file.relative_path(),
                    format_bytes(file.length())
                );
            } else {
                println!("   - {}", file.relative_path());
            }
        }
        println!();
    }

    if !diff.changed.is_empty() {
        println!(" Changed Files ({}):", diff.changed.len());
        for pair in &diff.changed {
            println!("   * {}", pair.old.relative_path());
            if detailed {
                println!(
                    "     Size: {} -> {} ({})",
                    format_bytes(pair.old.length()),
                    format_bytes(pair.new.length()),
                    format_size_diff(pair.old.length(), pair.new.length())
                );
                println!(
                    "     Modified: {} UTC",
                    pair.new.last_modified().format(TIME_FORMAT)
                );
            }
        }
        println!();
    }

    let unchanged = diff.unchanged_files();
    if !unchanged.is_empty() {
        println!(" Unchanged Files ({}):", unchanged.len());
        for file in unchanged.iter().take(UNCHANGED_PREVIEW) {
            println!("   = {}", file.relative_path());
        }
        if unchanged.len() > UNCHANGED_PREVIEW {
            println!("   ... and {} more", unchanged.len() - UNCHANGED_PREVIEW);
        }
        println!();
    }

    rule();
    println!();
    println!("Total changes: {}", diff.total_changes());
    println!("Size change  : {}", format_signed_bytes(diff.size_delta()));
}

/// Lines printed for one watch notification.
pub fn change_lines(change: &ChangeNotification) -> Vec<String> {
    let mut lines = Vec::with_capacity(change.total() + 1);
    lines.push(format!(
        "[{}] Changes detected:",
        change.detected_at.with_timezone(&Local).format("%H:%M:%S")
    ));
    lines.extend(change.added.iter().map(|p| format!("  + {p}")));
    lines.extend(change.removed.iter().map(|p| format!("  - {p}")));
    lines.extend(change.changed.iter().map(|p| format!("  * {p}")));
    lines
}

pub fn print_change(change: &ChangeNotification) {
    println!();
    for line in change_lines(change) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn update(n: u64) -> ScanProgress {
        ScanProgress {
            files_tracked: n,
            files_filtered: 0,
            files_failed: 0,
            bytes_tracked: 0,
            current_path: format!("file{n}.txt"),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_change_lines() {
        let change = ChangeNotification {
            detected_at: Utc::now(),
            added: vec!["new.txt".into()],
            removed: vec!["old.txt".into()],
            changed: vec!["edit.txt".into(), "more.txt".into()],
        };

        let lines = change_lines(&change);

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] Changes detected:"));
        assert_eq!(&lines[1..], ["  + new.txt", "  - old.txt", "  * edit.txt", "  * more.txt"]);
    }

    #[tokio::test]
    async fn test_drain_progress_survives_lag() {
        let (tx, rx) = broadcast::channel(4);
        for n in 1..=10 {
            tx.send(update(n)).unwrap();
        }
        drop(tx);

        let mut seen = Vec::new();
        let emitted = drain_progress(rx, |u| seen.push(u.files_seen())).await;

        assert_eq!(emitted, 4);
        assert_eq!(seen, [7, 8, 9, 10]);
    }

    #[tokio::test]
    async fn test_drain_progress_keeps_every_update_when_not_lagging() {
        let (tx, rx) = broadcast::channel(100);
        let printer = tokio::spawn(drain_progress(rx, |_| {}));
        for n in 1..=150 {
            tx.send(update(n)).unwrap();
            tokio::task::yield_now().await;
        }
        drop(tx);

        assert!(printer.await.unwrap() >= 100);
    }
}
