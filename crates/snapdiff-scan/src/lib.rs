//! Directory scanning engine for snapdiff.
//!
//! # Overview
//!
//! `snapdiff-scan` walks a directory tree, filters paths through the
//! include/exclude patterns of a [`FilterOptions`], hashes every kept file
//! with SHA-256 and assembles the result into a [`Snapshot`]. Key features:
//!
//! - **Deterministic traversal** via jwalk in serial, sorted mode
//! - **Streaming hashes** read in fixed-size chunks
//! - **Cancellation** checked between entries and between hash chunks
//! - **Progress updates** via broadcast channels
//!
//! Per-file faults (permission denied, file vanished, read errors) do not
//! stop the pass. They are collected as [`ScanWarning`]s on the
//! [`ScanReport`] and the file is left out.
//!
//! # Example
//!
//! ```rust,no_run
//! use snapdiff_scan::{ScanConfig, Scanner};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ScanConfig::new("/path/to/scan");
//! let report = Scanner::new().scan(&config, &CancellationToken::new()).unwrap();
//!
//! println!("Files: {}", report.snapshot.len());
//! println!("Total size: {} bytes", report.snapshot.total_size());
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use snapdiff_scan::Scanner;
//! use tokio::sync::broadcast::error::RecvError;
//!
//! let scanner = Scanner::new();
//! let mut progress_rx = scanner.subscribe();
//!
//! tokio::spawn(async move {
//!     loop {
//!         match progress_rx.recv().await {
//!             Ok(progress) => println!("Seen {} files", progress.files_seen()),
//!             Err(RecvError::Lagged(_)) => continue,
//!             Err(RecvError::Closed) => break,
//!         }
//!     }
//! });
//! ```

mod hasher;
mod progress;
mod scanner;

pub use hasher::{HASH_CHUNK_SIZE, HashError, hash_file, hash_reader};
pub use progress::{ScanProgress, ScanStats};
pub use scanner::{ScanReport, Scanner, take_snapshot};

// Re-export core types for convenience
pub use snapdiff_core::{
    FileEntry, FilterOptions, ScanConfig, ScanError, ScanWarning, Snapshot, WarningKind,
};
