//! CSV rendering.

use std::io::Write;

use snapdiff_core::{OutputFormat, Snapshot};
use snapdiff_diff::DiffResult;

use crate::{RenderError, Renderer, TIMESTAMP_FORMAT};

/// Comma-separated values with a header row. Paths are always quoted.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl Renderer for CsvRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }

    fn render_snapshot(&self, snapshot: &Snapshot) -> Result<Vec<u8>, RenderError> {
        let mut out = Vec::new();
        writeln!(out, "RelativePath,Length,LastWriteUtc,Sha256")?;
        for file in snapshot.files() {
            writeln!(
                out,
                "{},{},{},{}",
                escape_field(file.relative_path()),
                file.length(),
                file.last_modified().format(TIMESTAMP_FORMAT),
                file.content_hash()
            )?;
        }
        Ok(out)
    }

    fn render_diff(&self, diff: &DiffResult<'_>) -> Result<Vec<u8>, RenderError> {
        let mut out = Vec::new();
        writeln!(out, "Status,FilePath,OldSize,NewSize,LastModified")?;
        for file in &diff.added {
            writeln!(
                out,
                "Added,{},,{},{}",
                escape_field(file.relative_path()),
                file.length(),
                file.last_modified().format(TIMESTAMP_FORMAT)
            )?;
        }
        for file in &diff.removed {
            writeln!(
                out,
                "Removed,{},{},,{}",
                escape_field(file.relative_path()),
                file.length(),
                file.last_modified().format(TIMESTAMP_FORMAT)
            )?;
        }
        for pair in &diff.changed {
            writeln!(
                out,
                "Changed,{},{},{},{}",
                escape_field(pair.new.relative_path()),
                pair.old.length(),
                pair.new.length(),
                pair.new.last_modified().format(TIMESTAMP_FORMAT)
            )?;
        }
        Ok(out)
    }
}

fn escape_field(s: &str) -> String {
    let escaped = s.replace('"', "\"\"");
    format!("\"{escaped}\"")
}
