//! Viewport sampling
//!
//! Pulls every row currently mounted in the view into the `RowStore`.
//! Rows without an identity, rows already stored, and rows that render as
//! blank placeholders are skipped without side effects. An empty viewport is
//! a normal state, not a failure.

use super::store::{RowRecord, RowStore};
use super::view::LiveView;
use crate::util::preview;
use regex::Regex;
use std::sync::LazyLock;

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+").expect("line break pattern is valid"));

/// Reads painted rows and normalizes them into fixed-width records
#[derive(Debug, Clone)]
pub struct ViewportSampler {
    column_count: usize,
}

impl ViewportSampler {
    pub fn new(column_count: usize) -> Self {
        Self { column_count }
    }

    /// Sample the view once
    ///
    /// Returns `true` if at least one new row was added to `store`.
    pub fn sample<V: LiveView + ?Sized>(&self, view: &mut V, store: &mut RowStore) -> bool {
        let mut added = 0usize;

        for row in view.rendered_rows() {
            let Some(id) = row.id.filter(|id| !id.is_empty()) else {
                continue;
            };
            if store.contains(&id) {
                continue;
            }
            let Some(cells) = row.cells else {
                continue;
            };

            let cells: Vec<String> = cells
                .iter()
                .take(self.column_count)
                .map(|cell| normalize_cell(cell))
                .collect();

            // Blank placeholders are a virtualization artifact
            if cells.iter().all(String::is_empty) {
                continue;
            }

            tracing::trace!(
                "Sampled row {}: {}",
                id,
                preview(&cells[0], 40)
            );
            store.insert(RowRecord::new(id, cells, self.column_count));
            added += 1;
        }

        if added > 0 {
            tracing::debug!("Sampled {} new rows ({} total)", added, store.len());
        }
        added > 0
    }
}

/// Collapse line breaks to single spaces and trim
fn normalize_cell(raw: &str) -> String {
    LINE_BREAKS.replace_all(raw, " ").trim().to_string()
}
