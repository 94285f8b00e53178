//! Standalone HTML diff report.

use std::fmt::Write as _;

use chrono::Utc;

use snapdiff_core::{FileEntry, OutputFormat, Snapshot};
use snapdiff_diff::{DiffResult, format_bytes, format_signed_bytes, format_size_diff};

use crate::{RenderError, Renderer, TIMESTAMP_FORMAT};

const STYLE: &str = "\
body { font-family: 'Segoe UI', Arial, sans-serif; margin: 20px; background: #f5f5f5; }
h1 { color: #2c3e50; border-bottom: 3px solid #3498db; padding-bottom: 10px; }
h2 { color: #34495e; margin-top: 30px; }
.summary { background: white; padding: 20px; border-radius: 5px; margin: 20px 0; }
.added { color: #27ae60; font-weight: bold; }
.removed { color: #e74c3c; font-weight: bold; }
.changed { color: #f39c12; font-weight: bold; }
table { width: 100%; border-collapse: collapse; background: white; }
th, td { padding: 10px; text-align: left; border-bottom: 1px solid #ddd; }
th { background: #3498db; color: white; }
.meta { color: #7f8c8d; font-size: 0.9em; }
";

/// HTML page summarizing a diff. Snapshots have no HTML form.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    fn supports_snapshots(&self) -> bool {
        false
    }

    fn render_snapshot(&self, _snapshot: &Snapshot) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Unsupported {
            format: OutputFormat::Html,
            subject: "snapshots",
        })
    }

    fn render_diff(&self, diff: &DiffResult<'_>) -> Result<Vec<u8>, RenderError> {
        // Writing into a String cannot fail.
        let mut page = String::new();
        let _ = write_page(&mut page, diff);
        Ok(page.into_bytes())
    }
}

fn write_page(out: &mut String, diff: &DiffResult<'_>) -> std::fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(
        out,
        "<html><head><meta charset='utf-8'><title>snapdiff report</title>"
    )?;
    writeln!(out, "<style>\n{STYLE}</style></head><body>")?;
    writeln!(out, "<h1>snapdiff report</h1>")?;
    writeln!(
        out,
        "<p class='meta'><strong>Generated:</strong> {} UTC</p>",
        Utc::now().format(TIMESTAMP_FORMAT)
    )?;
    writeln!(
        out,
        "<p class='meta'><strong>Old snapshot:</strong> {} UTC ({})</p>",
        diff.old_snapshot.created_at().format(TIMESTAMP_FORMAT),
        escape_html(diff.old_snapshot.root_directory())
    )?;
    writeln!(
        out,
        "<p class='meta'><strong>New snapshot:</strong> {} UTC ({})</p>",
        diff.new_snapshot.created_at().format(TIMESTAMP_FORMAT),
        escape_html(diff.new_snapshot.root_directory())
    )?;

    writeln!(out, "<div class='summary'>\n<h2>Summary</h2>")?;
    writeln!(
        out,
        "<p><span class='added'>Added:</span> {} files</p>",
        diff.added.len()
    )?;
    writeln!(
        out,
        "<p><span class='removed'>Removed:</span> {} files</p>",
        diff.removed.len()
    )?;
    writeln!(
        out,
        "<p><span class='changed'>Changed:</span> {} files</p>",
        diff.changed.len()
    )?;
    writeln!(
        out,
        "<p><strong>Total size change:</strong> {}</p>\n</div>",
        format_signed_bytes(diff.size_delta())
    )?;

    write_file_table(out, "added", "Added Files", &diff.added)?;
    write_file_table(out, "removed", "Removed Files", &diff.removed)?;

    if !diff.changed.is_empty() {
        writeln!(out, "<h2 class='changed'>Changed Files</h2>")?;
        writeln!(
            out,
            "<table><tr><th>File Path</th><th>Old Size</th><th>New Size</th><th>Size Change</th><th>Modified</th></tr>"
        )?;
        for pair in &diff.changed {
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(pair.new.relative_path()),
                format_bytes(pair.old.length()),
                format_bytes(pair.new.length()),
                format_size_diff(pair.old.length(), pair.new.length()),
                pair.new.last_modified().format(TIMESTAMP_FORMAT)
            )?;
        }
        writeln!(out, "</table>")?;
    }

    writeln!(out, "</body></html>")
}

fn write_file_table(
    out: &mut String,
    class: &str,
    title: &str,
    files: &[&FileEntry],
) -> std::fmt::Result {
    if files.is_empty() {
        return Ok(());
    }

    writeln!(out, "<h2 class='{class}'>{title}</h2>")?;
    writeln!(
        out,
        "<table><tr><th>File Path</th><th>Size</th><th>Modified</th></tr>"
    )?;
    for file in files {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(file.relative_path()),
            format_bytes(file.length()),
            file.last_modified().format(TIMESTAMP_FORMAT)
        )?;
    }
    writeln!(out, "</table>")
}

/// Escape text for use in HTML element content and attribute values.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href='x'>&\"</a>"),
            "&lt;a href=&#39;x&#39;&gt;&amp;&quot;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain/path.txt"), "plain/path.txt");
    }
}
