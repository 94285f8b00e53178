//! Core types for snapdiff.
//!
//! This crate provides the data structures shared by the scanner, the diff
//! engine and the watch loop: file entries, snapshots, filter options with
//! glob matching, scan configuration, user settings and error types.

mod config;
mod error;
mod filter;
mod settings;
mod snapshot;

pub use config::{ScanConfig, ScanConfigBuilder};
pub use error::{ScanError, ScanWarning, SnapshotLoadError, WarningKind};
pub use filter::{
    FilterOptions, GlobPattern, OutputFormat, PathFilter, matches_pattern, normalize_path,
};
pub use settings::{AppConfig, ConfigError, DEFAULT_WATCH_INTERVAL_SECS};
pub use snapshot::{FileEntry, Snapshot};
