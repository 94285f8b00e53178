//! Snapshot and file entry types.

use std::path::Path;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotLoadError;
use crate::filter::{FilterOptions, normalize_path};

/// One tracked file inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Path relative to the snapshot root, always `/`-separated.
    relative_path: CompactString,

    /// Size in bytes.
    length: u64,

    /// Last modification time.
    #[serde(rename = "lastWriteUtc")]
    last_modified: DateTime<Utc>,

    /// Hex SHA-256 digest, empty when hashing was disabled.
    #[serde(rename = "sha256", default)]
    content_hash: String,
}

impl FileEntry {
    /// Create a new entry. The path is normalized to forward slashes.
    pub fn new(
        relative_path: &str,
        length: u64,
        last_modified: DateTime<Utc>,
        content_hash: impl Into<String>,
    ) -> Self {
        Self {
            relative_path: CompactString::from(normalize_path(relative_path)),
            length,
            last_modified,
            content_hash: content_hash.into(),
        }
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Whether a content hash was recorded.
    pub fn has_hash(&self) -> bool {
        !self.content_hash.is_empty()
    }

    /// Case-folded path used as the comparison key between snapshots.
    pub fn path_key(&self) -> String {
        normalize_path(&self.relative_path).to_lowercase()
    }
}

/// A point-in-time inventory of a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// When the traversal started.
    created_at: DateTime<Utc>,

    /// Absolute root directory that was scanned.
    root_directory: String,

    /// Entries in traversal order.
    files: Vec<FileEntry>,

    /// Options the snapshot was built with.
    #[serde(default)]
    options: FilterOptions,
}

impl Snapshot {
    /// Create a snapshot from a completed traversal.
    pub fn new(
        created_at: DateTime<Utc>,
        root_directory: impl Into<String>,
        files: Vec<FileEntry>,
        options: FilterOptions,
    ) -> Self {
        Self {
            created_at,
            root_directory: root_directory.into(),
            files,
            options,
        }
    }

    /// Read a persisted JSON snapshot from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotLoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SnapshotLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&json).map_err(|source| SnapshotLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a persisted JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn root_directory(&self) -> &str {
        &self.root_directory
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if no files were tracked.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of all tracked file sizes.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(FileEntry::length).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(path: &str, len: u64, hash: &str) -> FileEntry {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        FileEntry::new(path, len, ts, hash)
    }

    #[test]
    fn test_entry_path_normalized() {
        let e = entry(r"Sub\Dir\File.TXT", 3, "");
        assert_eq!(e.relative_path(), "Sub/Dir/File.TXT");
        assert_eq!(e.path_key(), "sub/dir/file.txt");
        assert!(!e.has_hash());
    }

    #[test]
    fn test_snapshot_totals() {
        let snap = Snapshot::new(
            Utc::now(),
            "/root",
            vec![entry("a", 10, "aa"), entry("b", 5, "bb")],
            FilterOptions::default(),
        );
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.total_size(), 15);
        assert!(!snap.is_empty());
    }

    #[test]
    fn test_persisted_shape() {
        let snap = Snapshot::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            "/root",
            vec![entry("dir/a.txt", 10, "abcd")],
            FilterOptions::new().exclude("*.tmp"),
        );
        let value = serde_json::to_value(&snap).unwrap();

        assert_eq!(value["createdAt"], "2024-05-01T12:00:00Z");
        assert_eq!(value["rootDirectory"], "/root");
        assert_eq!(value["files"][0]["relativePath"], "dir/a.txt");
        assert_eq!(value["files"][0]["length"], 10);
        assert_eq!(value["files"][0]["lastWriteUtc"], "2024-05-01T12:00:00Z");
        assert_eq!(value["files"][0]["sha256"], "abcd");
        assert_eq!(value["options"]["excludePatterns"][0], "*.tmp");
        assert_eq!(value["options"]["format"], "json");
    }

    #[test]
    fn test_from_json_tolerates_missing_options_and_hash() {
        let json = r#"{
            "createdAt": "2024-05-01T12:00:00Z",
            "rootDirectory": "C:/Projects",
            "files": [
                {"relativePath": "a.txt", "length": 1, "lastWriteUtc": "2024-05-01T12:00:00Z"}
            ]
        }"#;
        let snap = Snapshot::from_json(json).unwrap();
        assert_eq!(snap.files()[0].content_hash(), "");
        assert_eq!(snap.options(), &FilterOptions::default());
    }
}
