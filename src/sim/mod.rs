//! In-memory virtualized list
//!
//! Behaves like the windowed tables the extractor is aimed at:
//! - only rows inside the viewport (plus overscan) are mounted, and rows that
//!   leave the window are unmounted and lose their painted state
//! - freshly mounted rows render as blank placeholders for a few reads
//! - with `page_size` set, rows are loaded in pages and the scroll extent
//!   grows only once the next page lands, some reads after the bottom is hit
//!
//! The view advances its own clock on every `rendered_rows` read, so runs
//! are deterministic regardless of wall time.

pub mod capture;
pub mod demo;

use crate::extract::view::{LiveView, RenderedRow, ScrollMetrics, ViewHost};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Geometry and timing of a simulated list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Height of a single row in pixels
    pub row_height: u32,
    /// Visible height of the scroll target in pixels
    pub viewport_height: u32,
    /// Rows mounted beyond each edge of the viewport
    pub overscan_rows: usize,
    /// Reads a freshly mounted row stays blank
    pub paint_delay_reads: u32,
    /// Rows per lazily loaded page (`None` loads everything up front)
    pub page_size: Option<usize>,
    /// Reads between reaching the bottom and the next page landing
    pub load_delay_reads: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            row_height: 40,
            viewport_height: 600,
            overscan_rows: 2,
            paint_delay_reads: 1,
            page_size: None,
            load_delay_reads: 4,
        }
    }
}

/// Source data for one simulated row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRow {
    pub id: Option<String>,
    pub cells: Vec<String>,
}

impl SimRow {
    pub fn new(id: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            id: Some(id.into()),
            cells,
        }
    }

    /// A row whose element carries no identity attribute
    pub fn anonymous(cells: Vec<String>) -> Self {
        Self { id: None, cells }
    }
}

/// Windowed view over a fixed set of rows
#[derive(Debug, Clone)]
pub struct SimulatedView {
    rows: Vec<SimRow>,
    header_labels: Option<Vec<String>>,
    layout: Layout,
    offset: f64,
    /// Rows currently part of the scrollable extent
    loaded: usize,
    /// Reads until the next page lands, once a load is in flight
    pending_load: Option<u32>,
    /// Mounted row index -> reads since it was mounted
    mounted: BTreeMap<usize, u32>,
}

impl SimulatedView {
    pub fn new(rows: Vec<SimRow>, mut layout: Layout) -> Self {
        layout.row_height = layout.row_height.max(1);
        layout.viewport_height = layout.viewport_height.max(1);
        let loaded = layout
            .page_size
            .map_or(rows.len(), |page| page.max(1).min(rows.len()));
        Self {
            rows,
            header_labels: None,
            layout,
            offset: 0.0,
            loaded,
            pending_load: None,
            mounted: BTreeMap::new(),
        }
    }

    /// Raw header row labels, as the header row would render them
    pub fn with_header_labels(mut self, labels: Vec<String>) -> Self {
        self.header_labels = Some(labels);
        self
    }

    fn extent(&self) -> f64 {
        f64::from(self.layout.row_height) * self.loaded as f64
    }

    fn max_offset(&self) -> f64 {
        (self.extent() - f64::from(self.layout.viewport_height)).max(0.0)
    }

    /// Start or progress a pending page load
    fn advance_loading(&mut self) {
        let Some(page) = self.layout.page_size else {
            return;
        };
        if self.loaded >= self.rows.len() {
            return;
        }

        match self.pending_load {
            Some(0) => {
                self.loaded = (self.loaded + page.max(1)).min(self.rows.len());
                self.pending_load = None;
            }
            Some(remaining) => self.pending_load = Some(remaining - 1),
            None => {
                let bottom = self.offset + f64::from(self.layout.viewport_height);
                if bottom >= self.extent() - f64::from(self.layout.row_height) {
                    self.pending_load = Some(self.layout.load_delay_reads.saturating_sub(1));
                }
            }
        }
    }

    /// Recompute which rows are mounted for the current window
    fn remount(&mut self) {
        let row_height = f64::from(self.layout.row_height);
        let first = (self.offset / row_height).floor() as usize;
        let last = ((self.offset + f64::from(self.layout.viewport_height)) / row_height).ceil() as usize;

        let start = first.saturating_sub(self.layout.overscan_rows);
        let end = (last + self.layout.overscan_rows).min(self.loaded);

        self.mounted.retain(|index, _| (start..end).contains(index));
        for age in self.mounted.values_mut() {
            *age = age.saturating_add(1);
        }
        for index in start..end {
            self.mounted.entry(index).or_insert(0);
        }
    }
}

impl LiveView for SimulatedView {
    fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            offset: self.offset,
            extent: self.extent(),
            viewport: f64::from(self.layout.viewport_height),
        }
    }

    fn scroll_by(&mut self, delta: f64) {
        self.offset = (self.offset + delta).clamp(0.0, self.max_offset());
    }

    fn rendered_rows(&mut self) -> Vec<RenderedRow> {
        self.advance_loading();
        self.remount();

        self.mounted
            .iter()
            .map(|(&index, &age)| {
                let row = &self.rows[index];
                let cells = if age < self.layout.paint_delay_reads {
                    vec![String::new(); row.cells.len()]
                } else {
                    row.cells.clone()
                };
                RenderedRow {
                    id: row.id.clone(),
                    cells: Some(cells),
                }
            })
            .collect()
    }

    fn header_labels(&mut self) -> Option<Vec<String>> {
        self.header_labels.clone()
    }
}

/// A page hosting at most one simulated scroll target
#[derive(Debug, Clone, Default)]
pub struct SimulatedPage {
    selector: String,
    view: Option<SimulatedView>,
}

impl SimulatedPage {
    /// Mount `view` as the element matched by `selector`
    pub fn new(selector: impl Into<String>, view: SimulatedView) -> Self {
        Self {
            selector: selector.into(),
            view: Some(view),
        }
    }

    /// A page with nothing scrollable on it
    pub fn empty() -> Self {
        Self::default()
    }
}

impl ViewHost for SimulatedPage {
    fn locate(&mut self, selectors: &[String]) -> Option<&mut dyn LiveView> {
        if !selectors.iter().any(|s| *s == self.selector) {
            return None;
        }
        self.view.as_mut().map(|view| view as &mut dyn LiveView)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<SimRow> {
        (0..n)
            .map(|i| SimRow::new(format!("r{i}"), vec![format!("cell {i}")]))
            .collect()
    }

    fn ids(rendered: &[RenderedRow]) -> Vec<String> {
        rendered.iter().filter_map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_only_window_is_mounted() {
        let mut view = SimulatedView::new(rows(100), Layout::default());
        let rendered = view.rendered_rows();
        // 600 / 40 = 15 visible rows plus 2 overscan below
        assert_eq!(rendered.len(), 17);
        assert_eq!(rendered[0].id.as_deref(), Some("r0"));
    }

    #[test]
    fn test_rows_paint_after_delay() {
        let mut view = SimulatedView::new(rows(3), Layout::default());
        let first = view.rendered_rows();
        assert!(first
            .iter()
            .all(|r| r.cells.as_ref().is_some_and(|c| c.iter().all(String::is_empty))));

        let second = view.rendered_rows();
        assert_eq!(second[0].cells, Some(vec!["cell 0".to_string()]));
    }

    #[test]
    fn test_scrolled_out_rows_are_recycled() {
        let mut view = SimulatedView::new(rows(100), Layout::default());
        view.rendered_rows();
        view.rendered_rows();

        view.scroll_by(2000.0);
        let rendered = view.rendered_rows();
        assert!(!ids(&rendered).contains(&"r0".to_string()));
        // Remounted rows start blank again
        assert!(rendered[0].cells.as_ref().is_some_and(|c| c[0].is_empty()));
    }

    #[test]
    fn test_scroll_is_clamped_to_extent() {
        let mut view = SimulatedView::new(rows(20), Layout::default());
        view.scroll_by(10_000.0);
        let metrics = view.scroll_metrics();
        assert_eq!(metrics.offset, 200.0);
        assert!(metrics.at_extent(0.0));

        view.scroll_by(-10_000.0);
        assert_eq!(view.scroll_metrics().offset, 0.0);
    }

    #[test]
    fn test_pages_land_after_load_delay() {
        let layout = Layout {
            page_size: Some(20),
            load_delay_reads: 3,
            ..Layout::default()
        };
        let mut view = SimulatedView::new(rows(50), layout);
        assert_eq!(view.scroll_metrics().extent, 800.0);

        view.scroll_by(1000.0);
        view.rendered_rows(); // bottom reached, load starts
        view.rendered_rows();
        assert_eq!(view.scroll_metrics().extent, 800.0);
        view.rendered_rows();
        view.rendered_rows();
        assert_eq!(view.scroll_metrics().extent, 1600.0);
    }

    #[test]
    fn test_zero_row_height_is_clamped_once() {
        let layout = Layout {
            row_height: 0,
            ..Layout::default()
        };
        let mut view = SimulatedView::new(rows(30), layout);
        assert_eq!(view.scroll_metrics().extent, 30.0);
        assert_eq!(view.rendered_rows().len(), 30);
    }

    #[test]
    fn test_page_locates_by_selector() {
        let mut page = SimulatedPage::new("main", SimulatedView::new(rows(1), Layout::default()));
        assert!(page.locate(&["#missing".to_string()]).is_none());
        assert!(page
            .locate(&["#missing".to_string(), "main".to_string()])
            .is_some());
        assert!(SimulatedPage::empty().locate(&["main".to_string()]).is_none());
    }
}
