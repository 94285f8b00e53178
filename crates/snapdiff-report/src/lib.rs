//! Report rendering for snapdiff.
//!
//! Each output format implements [`Renderer`], which turns a snapshot or a
//! diff into bytes ready to be written to a file. [`renderer_for`] picks the
//! implementation for an [`OutputFormat`].
//!
//! | Format | Snapshot | Diff |
//! |--------|----------|------|
//! | JSON   | yes      | yes  |
//! | CSV    | yes      | yes  |
//! | HTML   | no       | yes  |

mod csv;
mod html;
mod json;

use std::path::Path;

use thiserror::Error;

use snapdiff_core::{OutputFormat, Snapshot};
use snapdiff_diff::DiffResult;

pub use csv::CsvRenderer;
pub use html::HtmlRenderer;
pub use json::{DiffExport, JsonRenderer};

/// Timestamp layout used in CSV and HTML output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors produced while rendering or writing a report.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("{format} output is not supported for {subject}")]
    Unsupported {
        format: OutputFormat,
        subject: &'static str,
    },
}

/// Renders snapshots and diffs in one output format.
pub trait Renderer: Send + Sync {
    /// The format this renderer produces.
    fn format(&self) -> OutputFormat;

    /// Whether [`Renderer::render_snapshot`] can succeed at all.
    fn supports_snapshots(&self) -> bool {
        true
    }

    /// Render a snapshot.
    fn render_snapshot(&self, snapshot: &Snapshot) -> Result<Vec<u8>, RenderError>;

    /// Render a diff.
    fn render_diff(&self, diff: &DiffResult<'_>) -> Result<Vec<u8>, RenderError>;
}

/// Renderer for `format`.
pub fn renderer_for(format: OutputFormat) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Json => Box::new(JsonRenderer),
        OutputFormat::Csv => Box::new(CsvRenderer),
        OutputFormat::Html => Box::new(HtmlRenderer),
    }
}

/// Write rendered bytes to `path`, creating parent directories.
pub fn write_report(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
