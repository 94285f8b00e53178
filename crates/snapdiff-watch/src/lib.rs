//! Polling watch mode for snapdiff.
//!
//! A [`WatchLoop`] takes a baseline snapshot, then sleeps, re-snapshots and
//! compares on a fixed interval. Cycles that find added, removed or changed
//! files produce a [`ChangeNotification`]. Cancellation through the
//! [`CancellationToken`](tokio_util::sync::CancellationToken) is the normal
//! way to end the loop and is not reported as an error.
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use snapdiff_core::FilterOptions;
//! use snapdiff_watch::WatchLoop;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), snapdiff_core::ScanError> {
//! let mut watch = WatchLoop::new(
//!     "/path/to/watch",
//!     FilterOptions::new().exclude("*.tmp"),
//!     Duration::from_secs(5),
//!     CancellationToken::new(),
//! );
//!
//! while let Some(change) = watch.next_change().await? {
//!     println!("{} paths changed", change.total());
//! }
//! # Ok(())
//! # }
//! ```

mod notification;
mod watcher;

pub use notification::ChangeNotification;
pub use watcher::{
    DEFAULT_WATCH_INTERVAL, WATCH_CHANNEL_SIZE, WatchEvent, WatchLoop, WatchState, start_watch,
};
