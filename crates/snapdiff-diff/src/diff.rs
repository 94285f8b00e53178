//! Reconciliation of two snapshots.
//!
//! Paths are matched case-insensitively. Each path present in either
//! snapshot ends up in exactly one of added, removed, changed or unchanged.

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use snapdiff_core::{FileEntry, Snapshot};

/// Configuration for snapshot comparison.
#[derive(Debug, Clone, Default, Builder)]
#[builder(setter(into), default)]
pub struct DiffConfig {
    /// Keep the list of files that did not change.
    pub show_unchanged: bool,
}

impl DiffConfig {
    /// Create a new config builder.
    pub fn builder() -> DiffConfigBuilder {
        DiffConfigBuilder::default()
    }
}

/// Old and new entries for one path whose contents changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangedFile<'a> {
    pub old: &'a FileEntry,
    pub new: &'a FileEntry,
}

impl ChangedFile<'_> {
    /// Size difference, new minus old.
    pub fn size_delta(&self) -> i64 {
        self.new.length() as i64 - self.old.length() as i64
    }
}

/// Classified difference between two snapshots.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult<'a> {
    /// Snapshot compared against.
    pub old_snapshot: &'a Snapshot,
    /// Snapshot being classified.
    pub new_snapshot: &'a Snapshot,
    /// Present only in the new snapshot, in new-snapshot order.
    pub added: Vec<&'a FileEntry>,
    /// Present only in the old snapshot, in old-snapshot order.
    pub removed: Vec<&'a FileEntry>,
    /// Present in both with a different hash or length.
    pub changed: Vec<ChangedFile<'a>>,
    /// Present in both and identical. Only filled in when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unchanged: Option<Vec<&'a FileEntry>>,
}

impl DiffResult<'_> {
    /// Net change in tracked bytes.
    pub fn size_delta(&self) -> i64 {
        self.added_size() as i64 - self.removed_size() as i64
            + self.changed.iter().map(ChangedFile::size_delta).sum::<i64>()
    }

    /// Bytes in added files.
    pub fn added_size(&self) -> u64 {
        self.added.iter().map(|f| f.length()).sum()
    }

    /// Bytes in removed files.
    pub fn removed_size(&self) -> u64 {
        self.removed.iter().map(|f| f.length()).sum()
    }

    /// Number of added, removed and changed files.
    pub fn total_changes(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }

    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }

    /// Unchanged files, empty when they were not requested.
    pub fn unchanged_files(&self) -> &[&FileEntry] {
        self.unchanged.as_deref().unwrap_or_default()
    }
}

/// Snapshot comparer.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    config: DiffConfig,
}

impl DiffEngine {
    /// Create a new engine with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new engine with custom config.
    pub fn with_config(config: DiffConfig) -> Self {
        Self { config }
    }

    /// Compare `old` against `new`.
    pub fn diff<'a>(&self, old: &'a Snapshot, new: &'a Snapshot) -> DiffResult<'a> {
        let old_map = index_by_path(old);
        let new_map = index_by_path(new);

        let mut added = Vec::new();
        let mut changed = Vec::new();
        let mut unchanged = self.config.show_unchanged.then(Vec::new);

        for (key, new_entry) in &new_map {
            match old_map.get(key) {
                None => added.push(*new_entry),
                Some(old_entry) if is_modified(old_entry, new_entry) => changed.push(ChangedFile {
                    old: *old_entry,
                    new: *new_entry,
                }),
                Some(_) => {
                    if let Some(unchanged) = unchanged.as_mut() {
                        unchanged.push(*new_entry);
                    }
                }
            }
        }

        let removed: Vec<&FileEntry> = old_map
            .iter()
            .filter(|(key, _)| !new_map.contains_key(*key))
            .map(|(_, entry)| *entry)
            .collect();

        let result = DiffResult {
            old_snapshot: old,
            new_snapshot: new,
            added,
            removed,
            changed,
            unchanged,
        };

        info!(
            added = result.added.len(),
            removed = result.removed.len(),
            changed = result.changed.len(),
            size_delta = result.size_delta(),
            "Diff complete"
        );

        result
    }
}

/// Compare two snapshots.
pub fn compute_diff<'a>(
    old: &'a Snapshot,
    new: &'a Snapshot,
    show_unchanged: bool,
) -> DiffResult<'a> {
    DiffEngine::with_config(DiffConfig { show_unchanged }).diff(old, new)
}

/// Whether two entries for the same path differ.
///
/// Lengths always count. Hashes only count when both sides have one, so
/// snapshots taken without hashing compare on length alone.
pub fn is_modified(old: &FileEntry, new: &FileEntry) -> bool {
    if old.length() != new.length() {
        return true;
    }

    old.has_hash()
        && new.has_hash()
        && !old.content_hash().eq_ignore_ascii_case(new.content_hash())
}

fn index_by_path(snapshot: &Snapshot) -> IndexMap<String, &FileEntry> {
    let mut map = IndexMap::with_capacity(snapshot.len());
    for entry in snapshot.files() {
        if let Some(previous) = map.insert(entry.path_key(), entry) {
            debug!(
                path = previous.relative_path(),
                "Duplicate path in snapshot, keeping the later entry"
            );
        }
    }
    map
}
