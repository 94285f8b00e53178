//! JWalk-based directory scanner that builds snapshots.

use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};
use jwalk::{Parallelism, WalkDir};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use snapdiff_core::{
    FileEntry, FilterOptions, PathFilter, ScanConfig, ScanError, ScanWarning, Snapshot,
    WarningKind,
};

use crate::hasher::{HashError, hash_file};
use crate::progress::{ProgressTracker, ScanProgress, ScanStats};

/// Result of one snapshot pass.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// The finished snapshot.
    pub snapshot: Snapshot,
    /// Counters for the pass.
    pub stats: ScanStats,
    /// Per-file faults; each faulted path is missing from the snapshot.
    pub warnings: Vec<ScanWarning>,
}

impl ScanReport {
    /// Whether any path was skipped because of a fault.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Sequential scanner using jwalk for traversal.
///
/// Entries are visited in sorted order on the calling thread, so two passes
/// over an unchanged tree list files in the same order.
#[derive(Clone)]
pub struct Scanner {
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl Scanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Snapshot the directory described by `config`.
    ///
    /// Returns [`ScanError::Cancelled`] as soon as `cancel` fires; the files
    /// collected so far are dropped.
    pub fn scan(
        &self,
        config: &ScanConfig,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        let created_at = Utc::now();
        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&config.root, e))?;

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        let filter = config.options.compile()?;
        let mut tracker = ProgressTracker::new();
        let mut warnings = Vec::new();

        let files = self.collect_files(
            config,
            &root_path,
            &filter,
            cancel,
            &mut tracker,
            &mut warnings,
        )?;

        let stats = tracker.finish();
        info!(
            root = %root_path.display(),
            files = stats.files_tracked,
            filtered = stats.files_filtered,
            failed = stats.files_failed,
            elapsed_ms = stats.duration.as_millis() as u64,
            "Snapshot complete"
        );

        let snapshot = Snapshot::new(
            created_at,
            root_path.to_string_lossy(),
            files,
            config.options.clone(),
        );

        Ok(ScanReport {
            snapshot,
            stats,
            warnings,
        })
    }

    /// Run [`Scanner::scan`] on the blocking thread pool.
    pub async fn scan_async(
        &self,
        config: ScanConfig,
        cancel: CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        let scanner = self.clone();
        tokio::task::spawn_blocking(move || scanner.scan(&config, &cancel))
            .await
            .map_err(|e| ScanError::Other {
                message: format!("Scan task failed: {e}"),
            })?
    }

    fn collect_files(
        &self,
        config: &ScanConfig,
        root_path: &Path,
        filter: &PathFilter,
        cancel: &CancellationToken,
        tracker: &mut ProgressTracker,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<Vec<FileEntry>, ScanError> {
        let walker = WalkDir::new(root_path)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(config.follow_symlinks);

        let mut files = Vec::new();

        for entry_result in walker {
            if cancel.is_cancelled() {
                debug!("Scan cancelled during traversal");
                return Err(ScanError::Cancelled);
            }

            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    warn!(path = %path.display(), error = %err, "Cannot read directory entry");
                    warnings.push(ScanWarning::new(path, err.to_string(), WarningKind::ReadError));
                    continue;
                }
            };

            // Directories, unfollowed links, sockets and the like are not tracked.
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(relative) = relative_path(root_path, &path) else {
                continue;
            };

            if !filter.is_included(&relative) {
                tracker.record_filtered();
                continue;
            }

            self.track_file(
                &path,
                &relative,
                config.options.no_hash,
                cancel,
                tracker,
                &mut files,
                warnings,
            )?;

            let _ = self.progress_tx.send(tracker.snapshot(&relative));
        }

        Ok(files)
    }

    /// Read one included file into `files`, or record why it was skipped.
    #[allow(clippy::too_many_arguments)]
    fn track_file(
        &self,
        path: &Path,
        relative: &str,
        no_hash: bool,
        cancel: &CancellationToken,
        tracker: &mut ProgressTracker,
        files: &mut Vec<FileEntry>,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<(), ScanError> {
        match self.read_entry(path, relative, no_hash, cancel) {
            Ok(file) => {
                debug!(path = %relative, length = file.length(), "Tracked file");
                tracker.record_file(file.length());
                files.push(file);
            }
            Err(EntryFault::Cancelled) => {
                debug!("Scan cancelled while hashing");
                return Err(ScanError::Cancelled);
            }
            Err(EntryFault::Warning(warning)) => {
                warn!(path = %relative, "{}", warning.message);
                tracker.record_fault();
                warnings.push(warning);
            }
        }
        Ok(())
    }

    fn read_entry(
        &self,
        path: &Path,
        relative: &str,
        no_hash: bool,
        cancel: &CancellationToken,
    ) -> Result<FileEntry, EntryFault> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| EntryFault::Warning(ScanWarning::metadata_error(path, &e)))?;

        let modified = modified_time(&metadata, relative);

        let hash = if no_hash {
            String::new()
        } else {
            match hash_file(path, cancel) {
                Ok(hash) => hash,
                Err(HashError::Cancelled) => return Err(EntryFault::Cancelled),
                Err(HashError::Io(e)) => {
                    return Err(EntryFault::Warning(ScanWarning::read_error(path, &e)));
                }
            }
        };

        Ok(FileEntry::new(relative, metadata.len(), modified, hash))
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot `root` with `options` on the blocking thread pool.
pub async fn take_snapshot(
    root: impl Into<PathBuf>,
    options: FilterOptions,
    cancel: &CancellationToken,
) -> Result<ScanReport, ScanError> {
    let config = ScanConfig::new(root).with_options(options);
    Scanner::new().scan_async(config, cancel.clone()).await
}

/// Last write time, or the epoch when the platform cannot report one.
fn modified_time(metadata: &std::fs::Metadata, relative: &str) -> DateTime<Utc> {
    match metadata.modified() {
        Ok(time) => time.into(),
        Err(e) => {
            debug!(path = %relative, error = %e, "No modification time, recording the epoch");
            UNIX_EPOCH.into()
        }
    }
}

#[derive(Debug)]
enum EntryFault {
    Cancelled,
    Warning(ScanWarning),
}

/// Path of `path` below `root`, joined with `/`.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let stripped = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = stripped
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
