//! Table captures
//!
//! A capture is a JSON snapshot of a table (header labels plus every row's
//! identity and cell text) together with the layout the list had when it was
//! captured. Replaying it through `SimulatedView` reproduces the windowing
//! behaviour, so an export can be rerun offline:
//!
//! ```json
//! {
//!   "scroller": "main",
//!   "headers": ["Name", "Name", "Owner", "+"],
//!   "rows": [
//!     { "id": "9f2c", "cells": ["Acme, Inc.", "Vendor"] },
//!     { "cells": ["row without identity"] }
//!   ],
//!   "layout": { "row_height": 33, "page_size": 50 }
//! }
//! ```

use super::{Layout, SimRow, SimulatedPage, SimulatedView};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// One captured row element
#[derive(Debug, Clone, Deserialize)]
pub struct CapturedRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub cells: Vec<String>,
}

/// A captured table
#[derive(Debug, Clone, Deserialize)]
pub struct Capture {
    /// Selector the scroll target was found under (defaults to the first
    /// configured selector)
    #[serde(default)]
    pub scroller: Option<String>,
    /// Raw header row labels, if a header row was present
    #[serde(default)]
    pub headers: Option<Vec<String>>,
    pub rows: Vec<CapturedRow>,
    #[serde(default)]
    pub layout: Layout,
}

impl Capture {
    /// Load a capture from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read capture {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid capture {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Failed to parse capture JSON")
    }

    /// Mount the capture as a page
    ///
    /// `default_selector` is used when the capture does not name its scroller.
    pub fn into_page(self, default_selector: &str) -> SimulatedPage {
        let selector = self
            .scroller
            .unwrap_or_else(|| default_selector.to_string());
        let rows = self
            .rows
            .into_iter()
            .map(|row| SimRow {
                id: row.id,
                cells: row.cells,
            })
            .collect();

        let mut view = SimulatedView::new(rows, self.layout);
        if let Some(headers) = self.headers {
            view = view.with_header_labels(headers);
        }
        SimulatedPage::new(selector, view)
    }
}
