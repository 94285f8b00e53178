use chrono::{TimeZone, Utc};
use snapdiff_core::{FileEntry, FilterOptions, OutputFormat, Snapshot};
use snapdiff_diff::compute_diff;
use snapdiff_report::{RenderError, renderer_for, write_report};
use tempfile::TempDir;

fn snapshots() -> (Snapshot, Snapshot) {
    let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let old = Snapshot::new(
        ts,
        "/data",
        vec![
            FileEntry::new("foo.txt", 10, ts, "h1"),
            FileEntry::new("old,name.txt", 4, ts, "h0"),
        ],
        FilterOptions::new(),
    );
    let new = Snapshot::new(
        ts,
        "/data",
        vec![
            FileEntry::new("foo.txt", 12, ts, "h2"),
            FileEntry::new("<b>.txt", 5, ts, "h3"),
        ],
        FilterOptions::new().exclude("*.tmp"),
    );
    (old, new)
}

#[test]
fn test_json_snapshot_reloads() {
    let (_, new) = snapshots();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out").join("snap.json");

    let bytes = renderer_for(OutputFormat::Json)
        .render_snapshot(&new)
        .unwrap();
    write_report(&path, &bytes).unwrap();

    assert_eq!(Snapshot::load(&path).unwrap(), new);
}

#[test]
fn test_json_diff_has_size_delta() {
    let (old, new) = snapshots();
    let diff = compute_diff(&old, &new, false);

    let bytes = renderer_for(OutputFormat::Json).render_diff(&diff).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value["sizeDelta"], 3);
    assert_eq!(value["added"][0]["relativePath"], "<b>.txt");
    assert_eq!(value["removed"][0]["relativePath"], "old,name.txt");
    assert_eq!(value["changed"][0]["new"]["length"], 12);
}

#[test]
fn test_csv_snapshot() {
    let (old, _) = snapshots();
    let bytes = renderer_for(OutputFormat::Csv)
        .render_snapshot(&old)
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "RelativePath,Length,LastWriteUtc,Sha256");
    assert_eq!(lines[1], "\"foo.txt\",10,2025-01-02 03:04:05,h1");
    assert_eq!(lines[2], "\"old,name.txt\",4,2025-01-02 03:04:05,h0");
}

#[test]
fn test_csv_diff() {
    let (old, new) = snapshots();
    let diff = compute_diff(&old, &new, false);
    let bytes = renderer_for(OutputFormat::Csv).render_diff(&diff).unwrap();
    let text = String::from_utf8(bytes).unwrap();

    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        vec![
            "Status,FilePath,OldSize,NewSize,LastModified",
            "Added,\"<b>.txt\",,5,2025-01-02 03:04:05",
            "Removed,\"old,name.txt\",4,,2025-01-02 03:04:05",
            "Changed,\"foo.txt\",10,12,2025-01-02 03:04:05",
        ]
    );
}

#[test]
fn test_html_diff_escapes_paths() {
    let (old, new) = snapshots();
    let diff = compute_diff(&old, &new, false);
    let html = String::from_utf8(
        renderer_for(OutputFormat::Html)
            .render_diff(&diff)
            .unwrap(),
    )
    .unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("&lt;b&gt;.txt"));
    assert!(!html.contains("<td><b>.txt"));
    assert!(html.contains("Changed Files"));
    assert!(html.contains("+2 B (+20%)"));
}

#[test]
fn test_html_snapshot_unsupported() {
    let (old, _) = snapshots();
    let renderer = renderer_for(OutputFormat::Html);

    assert_eq!(renderer.format(), OutputFormat::Html);
    assert!(!renderer.supports_snapshots());
    assert!(matches!(
        renderer.render_snapshot(&old),
        Err(RenderError::Unsupported { .. })
    ));
}

#[test]
fn test_snapshot_capable_formats() {
    assert!(renderer_for(OutputFormat::Json).supports_snapshots());
    assert!(renderer_for(OutputFormat::Csv).supports_snapshots());
    assert!(!renderer_for(OutputFormat::Html).supports_snapshots());
}
