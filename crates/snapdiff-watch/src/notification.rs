//! Change notifications emitted by the watch loop.

use chrono::{DateTime, Utc};
use serde::Serialize;

use snapdiff_diff::DiffResult;

/// Paths that changed between two consecutive watch cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotification {
    /// When the change was detected.
    pub detected_at: DateTime<Utc>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

impl ChangeNotification {
    /// Capture the paths of a diff, dropping the borrowed entries.
    pub fn from_diff(diff: &DiffResult<'_>, detected_at: DateTime<Utc>) -> Self {
        Self {
            detected_at,
            added: diff
                .added
                .iter()
                .map(|f| f.relative_path().to_string())
                .collect(),
            removed: diff
                .removed
                .iter()
                .map(|f| f.relative_path().to_string())
                .collect(),
            changed: diff
                .changed
                .iter()
                .map(|c| c.new.relative_path().to_string())
                .collect(),
        }
    }

    /// Number of paths mentioned.
    pub fn total(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
