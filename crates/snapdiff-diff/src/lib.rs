//! Snapshot comparison for snapdiff.
//!
//! This crate reconciles two [`Snapshot`]s into a [`DiffResult`]:
//!
//! - **Added** - paths only in the new snapshot
//! - **Removed** - paths only in the old snapshot
//! - **Changed** - paths in both whose length or content hash differ
//! - **Unchanged** - everything else, kept only on request
//!
//! Paths are compared case-insensitively. Comparison is pure and does no I/O;
//! the result borrows from both snapshots.
//!
//! ```rust,no_run
//! use snapdiff_core::Snapshot;
//! use snapdiff_diff::{compute_diff, format_signed_bytes};
//!
//! let old = Snapshot::load("before.json").unwrap();
//! let new = Snapshot::load("after.json").unwrap();
//! let diff = compute_diff(&old, &new, false);
//!
//! println!("{} changes", diff.total_changes());
//! println!("Size change: {}", format_signed_bytes(diff.size_delta()));
//! ```

mod diff;
pub mod format;

pub use diff::{
    ChangedFile, DiffConfig, DiffConfigBuilder, DiffEngine, DiffResult, compute_diff, is_modified,
};
pub use format::{format_bytes, format_percent, format_signed_bytes, format_size_diff};

// Re-export core types
pub use snapdiff_core::{FileEntry, Snapshot};
