//! Live view seam
//!
//! The extraction core never talks to a rendering technology directly.
//! A `ViewHost` resolves the scrollable element from an ordered list of
//! candidate selectors, and the resulting `LiveView` exposes the handful of
//! bulk reads the core needs (row elements, header labels, scroll metrics)
//! plus scroll writes.
//!
//! The view is externally owned and may re-render between any two calls.
//! Nothing read from it is cached across ticks.

/// Scroll position and size of the target, read fresh on every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Current scroll offset in pixels (may be fractional)
    pub offset: f64,
    /// Total scrollable height in pixels
    pub extent: f64,
    /// Visible height of the target in pixels
    pub viewport: f64,
}

impl ScrollMetrics {
    /// Offset rounded up, matching how fractional scroll positions are reported
    pub fn top(&self) -> f64 {
        self.offset.ceil()
    }

    /// Whether the viewport touches the end of the scrollable extent
    ///
    /// `tolerance` absorbs sub-pixel and rounding slack.
    pub fn at_extent(&self, tolerance: f64) -> bool {
        self.top() + self.viewport >= self.extent - tolerance
    }
}

/// A row element as currently present in the render tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedRow {
    /// Value of the element's identity attribute, if it carries one
    pub id: Option<String>,
    /// Raw text of each cell; `None` while the row container is not rendered
    pub cells: Option<Vec<String>>,
}

impl RenderedRow {
    pub fn new(id: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            id: Some(id.into()),
            cells: Some(cells),
        }
    }
}

/// Read/scroll access to a mounted virtualized list
pub trait LiveView: Send {
    /// Current scroll metrics
    fn scroll_metrics(&self) -> ScrollMetrics;

    /// Advance the scroll position by `delta` pixels (the view clamps)
    fn scroll_by(&mut self, delta: f64);

    /// Row elements currently mounted, in document order
    fn rendered_rows(&mut self) -> Vec<RenderedRow>;

    /// Raw label texts of the header row, `None` if no header row is rendered
    fn header_labels(&mut self) -> Option<Vec<String>>;
}

/// The page that hosts the scroll target
pub trait ViewHost: Send {
    /// Resolve the scroll target, trying `selectors` in order
    fn locate(&mut self, selectors: &[String]) -> Option<&mut dyn LiveView>;
}
