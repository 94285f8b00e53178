//! JSON rendering.

use serde::Serialize;

use snapdiff_core::{OutputFormat, Snapshot};
use snapdiff_diff::DiffResult;

use crate::{RenderError, Renderer};

/// Exported shape of a diff: the diff itself plus the net size change.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffExport<'d, 'a> {
    #[serde(flatten)]
    pub diff: &'d DiffResult<'a>,
    pub size_delta: i64,
}

impl<'d, 'a> DiffExport<'d, 'a> {
    pub fn new(diff: &'d DiffResult<'a>) -> Self {
        Self {
            diff,
            size_delta: diff.size_delta(),
        }
    }
}

/// Pretty-printed JSON, readable back with [`Snapshot::load`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn render_snapshot(&self, snapshot: &Snapshot) -> Result<Vec<u8>, RenderError> {
        Ok(serde_json::to_vec_pretty(snapshot)?)
    }

    fn render_diff(&self, diff: &DiffResult<'_>) -> Result<Vec<u8>, RenderError> {
        Ok(serde_json::to_vec_pretty(&DiffExport::new(diff))?)
    }
}
