//! Scroll driver state machine
//!
//! Completion of a virtualized list can only be inferred from local
//! signals: what is painted right now and where the scrollbar sits. The
//! driver therefore loops through four states:
//!
//! ```text
//!            ┌──────────────────────── new rows / offset moved ───────────────┐
//!            v                                                                │
//!   Scanning ──(not done)── pause, resample, scroll_by(delta) ──> Settling ──(timeout)──> Stalled
//!      │  ^                                                                      │
//!      │  └──────────────────────────────────────────────────────────────────────┘
//!      └──(at extent && empty scans >= threshold, or cancelled)──> Done
//! ```
//!
//! A list can report "at extent" before it has lazily inserted the next
//! page, so reaching the bottom once is not enough: the driver needs
//! `empty_scan_threshold` consecutive scans without new rows while at the
//! bottom before it stops.

use super::headers::HeaderSet;
use super::sampler::ViewportSampler;
use super::store::{RowRecord, RowStore};
use super::view::LiveView;
use crate::config::ExtractionConfig;
use crate::events::{EventChannels, ExportEvent};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Driver states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    /// Sample, then either finish or advance the scroll position
    Scanning,
    /// Waiting for a just-issued scroll to paint new content
    Settling,
    /// The settle wait elapsed without new content
    Stalled,
    /// Terminal
    Done,
}

/// Mutable state owned by a single run
///
/// Created fresh per export and consumed by `ScrollDriver::run`.
pub struct RunContext {
    /// Shared run flag; cleared externally to cancel
    active: Arc<AtomicBool>,
    /// Row count published after every sampling tick
    progress: Arc<AtomicUsize>,
    channels: EventChannels,
    store: RowStore,
    state: DriverState,
    empty_scans: u32,
    iterations: u64,
    cancelled: bool,
}

impl RunContext {
    pub fn new(active: Arc<AtomicBool>, progress: Arc<AtomicUsize>, channels: EventChannels) -> Self {
        progress.store(0, Ordering::Release);
        Self {
            active,
            progress,
            channels,
            store: RowStore::new(),
            state: DriverState::Scanning,
            empty_scans: 0,
            iterations: 0,
            cancelled: false,
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Publish the row count after a sampling tick
    fn report_progress(&self, before: usize) {
        let rows = self.store.len();
        self.progress.store(rows, Ordering::Release);
        if rows > before {
            self.channels.send(ExportEvent::Progress {
                timestamp: Utc::now(),
                rows,
            });
        }
    }

    fn transition(&mut self, to: DriverState) {
        if self.state == to {
            return;
        }
        tracing::debug!(
            "{:?} -> {:?} (rows: {}, empty scans: {})",
            self.state,
            to,
            self.store.len(),
            self.empty_scans
        );
        self.channels.send(ExportEvent::StateChanged {
            timestamp: Utc::now(),
            from: self.state,
            to,
            rows: self.store.len(),
        });
        self.state = to;
    }
}

/// Outcome of a finished run, consumed once by the serializer
#[derive(Debug)]
pub struct RunResult {
    pub headers: HeaderSet,
    /// Rows in insertion order
    pub rows: Vec<RowRecord>,
    /// The run flag was cleared before completion was detected
    pub cancelled: bool,
    /// Number of scanning iterations
    pub iterations: u64,
}

/// Advances the viewport until the list is exhausted
#[derive(Debug, Clone)]
pub struct ScrollDriver {
    policy: ExtractionConfig,
    sampler: ViewportSampler,
}

impl ScrollDriver {
    pub fn new(policy: ExtractionConfig, column_count: usize) -> Self {
        Self {
            policy,
            sampler: ViewportSampler::new(column_count),
        }
    }

    /// Run the state machine to completion (or cancellation)
    pub async fn run<V: LiveView + ?Sized>(
        &self,
        view: &mut V,
        mut ctx: RunContext,
        headers: HeaderSet,
    ) -> RunResult {
        let tolerance = f64::from(self.policy.bottom_tolerance_px);
        let delta = f64::from(self.policy.scroll_delta_px);
        let mut origin_top = 0.0;

        loop {
            if ctx.state != DriverState::Done && !ctx.is_active() {
                tracing::warn!(
                    "Run cancelled with {} rows collected, exporting partial result",
                    ctx.store.len()
                );
                ctx.cancelled = true;
                ctx.transition(DriverState::Done);
            }

            match ctx.state {
                DriverState::Scanning => {
                    ctx.iterations += 1;
                    let before = ctx.store.len();
                    let found = self.sampler.sample(view, &mut ctx.store);
                    ctx.report_progress(before);

                    if found {
                        ctx.empty_scans = 0;
                    } else {
                        ctx.empty_scans += 1;
                    }

                    let metrics = view.scroll_metrics();
                    if metrics.at_extent(tolerance)
                        && ctx.empty_scans >= self.policy.empty_scan_threshold
                    {
                        ctx.transition(DriverState::Done);
                        continue;
                    }

                    // Rows mounted this tick may still be placeholders;
                    // scrolling now would unmount them before they paint
                    tokio::time::sleep(self.policy.scan_delay()).await;
                    if !ctx.is_active() {
                        continue;
                    }
                    let before = ctx.store.len();
                    if self.sampler.sample(view, &mut ctx.store) {
                        ctx.empty_scans = 0;
                    }
                    ctx.report_progress(before);

                    origin_top = view.scroll_metrics().top();
                    view.scroll_by(delta);
                    ctx.transition(DriverState::Settling);
                }
                DriverState::Settling => {
                    let next = self.settle(view, &mut ctx, origin_top).await;
                    ctx.transition(next);
                }
                DriverState::Stalled => {
                    // Counts as an empty scan; the counter is left alone
                    ctx.transition(DriverState::Scanning);
                }
                DriverState::Done => break,
            }
        }

        tracing::info!(
            "Extraction finished: {} rows in {} scans{}",
            ctx.store.len(),
            ctx.iterations,
            if ctx.cancelled { " (cancelled)" } else { "" }
        );

        RunResult {
            headers,
            rows: ctx.store.into_rows(),
            cancelled: ctx.cancelled,
            iterations: ctx.iterations,
        }
    }

    /// Poll until new rows paint, the view catches up, or the wait elapses
    async fn settle<V: LiveView + ?Sized>(
        &self,
        view: &mut V,
        ctx: &mut RunContext,
        origin_top: f64,
    ) -> DriverState {
        let poll = self.policy.poll_interval();
        let max_wait = self.policy.max_settle();
        let progress = f64::from(self.policy.settle_progress_px);
        let mut waited = Duration::ZERO;

        while waited < max_wait {
            tokio::time::sleep(poll).await;
            waited += poll;

            if !ctx.is_active() {
                return DriverState::Scanning;
            }

            let before = ctx.store.len();
            let found = self.sampler.sample(view, &mut ctx.store);
            ctx.report_progress(before);

            if found || view.scroll_metrics().top() > origin_top + progress {
                ctx.empty_scans = 0;
                return DriverState::Scanning;
            }
        }

        tracing::debug!("No new content after {:?}", max_wait);
        DriverState::Stalled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormatConfig;
    use crate::extract::view::{RenderedRow, ScrollMetrics};
    use crate::sim::{Layout, SimRow, SimulatedView};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn policy() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    fn sim_rows(n: usize) -> Vec<SimRow> {
        (0..n)
            .map(|i| SimRow::new(format!("id-{i}"), vec![format!("Row {i}"), i.to_string()]))
            .collect()
    }

    fn context() -> (RunContext, Arc<AtomicBool>) {
        let active = Arc::new(AtomicBool::new(true));
        let ctx = RunContext::new(
            active.clone(),
            Arc::new(AtomicUsize::new(0)),
            EventChannels::default(),
        );
        (ctx, active)
    }

    fn headers() -> HeaderSet {
        HeaderSet::new(FormatConfig::default().default_headers)
    }

    fn assert_complete(result: &RunResult, n: usize) {
        let ids: HashSet<&str> = result.rows.iter().map(|r| r.id()).collect();
        assert_eq!(ids.len(), result.rows.len(), "duplicate identifiers");
        assert_eq!(result.rows.len(), n);
        for i in 0..n {
            assert!(ids.contains(format!("id-{i}").as_str()), "missing id-{i}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_collects_every_row_of_a_short_list() {
        let mut view = SimulatedView::new(sim_rows(5), Layout::default());
        let (ctx, _) = context();

        let result = ScrollDriver::new(policy(), 4).run(&mut view, ctx, headers()).await;

        assert_complete(&result, 5);
        assert!(!result.cancelled);
        assert_eq!(result.rows[0].cells(), &["Row 0", "0", "", ""]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_collects_every_row_across_recycled_windows() {
        let mut view = SimulatedView::new(sim_rows(250), Layout::default());
        let (ctx, _) = context();

        let result = ScrollDriver::new(policy(), 4).run(&mut view, ctx, headers()).await;

        assert_complete(&result, 250);
        // Insertion order follows scroll order
        assert_eq!(result.rows.first().map(|r| r.id()), Some("id-0"));
        assert_eq!(result.rows.last().map(|r| r.id()), Some("id-249"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_window_is_collected_before_scrolling_away() {
        let layout = Layout::default();
        assert_eq!(layout.paint_delay_reads, 1);
        let mut view = SimulatedView::new(sim_rows(100), layout);
        let (ctx, _) = context();

        let result = ScrollDriver::new(policy(), 4).run(&mut view, ctx, headers()).await;

        // The first read sees only placeholders for rows 0..=16
        let ids: Vec<&str> = result.rows.iter().take(8).map(|r| r.id()).collect();
        assert_eq!(
            ids,
            ["id-0", "id-1", "id-2", "id-3", "id-4", "id-5", "id-6", "id-7"]
        );
        assert_complete(&result, 100);
    }

    /// Records when each scroll step is issued
    struct TimedView {
        inner: SimulatedView,
        start: tokio::time::Instant,
        scrolls: Vec<Duration>,
    }

    impl LiveView for TimedView {
        fn scroll_metrics(&self) -> ScrollMetrics {
            self.inner.scroll_metrics()
        }

        fn scroll_by(&mut self, delta: f64) {
            self.scrolls.push(self.start.elapsed());
            self.inner.scroll_by(delta);
        }

        fn rendered_rows(&mut self) -> Vec<RenderedRow> {
            self.inner.rendered_rows()
        }

        fn header_labels(&mut self) -> Option<Vec<String>> {
            None
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_delay_precedes_every_scroll_step() {
        let policy = ExtractionConfig {
            scan_delay_ms: 250,
            ..policy()
        };
        let mut view = TimedView {
            inner: SimulatedView::new(sim_rows(60), Layout::default()),
            start: tokio::time::Instant::now(),
            scrolls: Vec::new(),
        };
        let (ctx, _) = context();

        let result = ScrollDriver::new(policy, 4).run(&mut view, ctx, headers()).await;

        assert_complete(&result, 60);
        assert!(view.scrolls.len() > 2);
        assert!(view.scrolls[0] >= Duration::from_millis(250));
        // Each step waits out at least one settle poll plus the scan delay
        for pair in view.scrolls.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(350), "{:?}", pair);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_lazily_loaded_pages() {
        let layout = Layout {
            page_size: Some(30),
            load_delay_reads: 6,
            ..Layout::default()
        };
        let mut view = SimulatedView::new(sim_rows(100), layout);
        let (ctx, _) = context();

        let result = ScrollDriver::new(policy(), 4).run(&mut view, ctx, headers()).await;

        assert_complete(&result, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_list_finishes_without_rows() {
        let mut view = SimulatedView::new(Vec::new(), Layout::default());
        let (ctx, _) = context();

        let result = ScrollDriver::new(policy(), 4).run(&mut view, ctx, headers()).await;

        assert!(result.rows.is_empty());
        assert!(!result.cancelled);
        // Two empty scans at the bottom
        assert_eq!(result.iterations, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleared_run_flag_stops_with_partial_rows() {
        let mut view = SimulatedView::new(sim_rows(500), Layout::default());
        let (ctx, active) = context();
        active.store(false, Ordering::Release);

        let result = ScrollDriver::new(policy(), 4).run(&mut view, ctx, headers()).await;

        assert!(result.cancelled);
        assert_eq!(result.iterations, 0);
        assert!(result.rows.is_empty());
    }

    /// Clears the run flag after a fixed number of row reads
    struct CancellingView {
        inner: SimulatedView,
        active: Arc<AtomicBool>,
        reads_left: usize,
    }

    impl LiveView for CancellingView {
        fn scroll_metrics(&self) -> ScrollMetrics {
            self.inner.scroll_metrics()
        }

        fn scroll_by(&mut self, delta: f64) {
            self.inner.scroll_by(delta);
        }

        fn rendered_rows(&mut self) -> Vec<RenderedRow> {
            if self.reads_left == 0 {
                self.active.store(false, Ordering::Release);
            } else {
                self.reads_left -= 1;
            }
            self.inner.rendered_rows()
        }

        fn header_labels(&mut self) -> Option<Vec<String>> {
            self.inner.header_labels()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_mid_run_keeps_collected_rows() {
        let (ctx, active) = context();
        let mut view = CancellingView {
            inner: SimulatedView::new(sim_rows(500), Layout::default()),
            active,
            reads_left: 6,
        };

        let result = ScrollDriver::new(policy(), 4).run(&mut view, ctx, headers()).await;

        assert!(result.cancelled);
        assert!(!result.rows.is_empty());
        assert!(result.rows.len() < 500);
    }

    /// A list that claims to be at its extent while the next page is still
    /// being inserted: the first scan at the bottom sees nothing new
    struct FalseBottomView {
        pages: Vec<Vec<RenderedRow>>,
        shown: usize,
        reads_at_bottom: usize,
    }

    impl LiveView for FalseBottomView {
        fn scroll_metrics(&self) -> ScrollMetrics {
            // Always reports being at the bottom
            ScrollMetrics {
                offset: 0.0,
                extent: 600.0,
                viewport: 600.0,
            }
        }

        fn scroll_by(&mut self, _delta: f64) {}

        fn rendered_rows(&mut self) -> Vec<RenderedRow> {
            self.reads_at_bottom += 1;
            // Reveal the next page on the first settle poll after an empty scan
            if self.reads_at_bottom == 3 && self.shown + 1 < self.pages.len() {
                self.shown += 1;
                self.reads_at_bottom = 0;
            }
            self.pages[self.shown].clone()
        }

        fn header_labels(&mut self) -> Option<Vec<String>> {
            None
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_empty_scan_at_bottom_does_not_finish() {
        let page = |range: std::ops::Range<usize>| {
            range
                .map(|i| RenderedRow::new(format!("id-{i}"), vec![format!("Row {i}")]))
                .collect::<Vec<_>>()
        };
        let mut view = FalseBottomView {
            pages: vec![page(0..10), page(10..20), page(20..30)],
            shown: 0,
            reads_at_bottom: 0,
        };
        let (ctx, _) = context();

        let result = ScrollDriver::new(policy(), 4).run(&mut view, ctx, headers()).await;

        assert_complete(&result, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_counter_tracks_rows() {
        let mut view = SimulatedView::new(sim_rows(40), Layout::default());
        let active = Arc::new(AtomicBool::new(true));
        let progress = Arc::new(AtomicUsize::new(7));
        let ctx = RunContext::new(active, progress.clone(), EventChannels::default());
        assert_eq!(progress.load(Ordering::Acquire), 0);

        let result = ScrollDriver::new(policy(), 4).run(&mut view, ctx, headers()).await;

        assert_eq!(progress.load(Ordering::Acquire), result.rows.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_changes_and_progress_are_published() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(4096);
        let channels = EventChannels {
            progress: Some(tx),
            journal: None,
        };
        let ctx = RunContext::new(
            Arc::new(AtomicBool::new(true)),
            Arc::new(AtomicUsize::new(0)),
            channels,
        );
        let mut view = SimulatedView::new(sim_rows(30), Layout::default());

        ScrollDriver::new(policy(), 4).run(&mut view, ctx, headers()).await;

        let mut last_rows = 0;
        let mut saw_done = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                ExportEvent::Progress { rows, .. } => {
                    assert!(rows > last_rows, "progress must grow");
                    last_rows = rows;
                }
                ExportEvent::StateChanged { to, .. } => {
                    saw_done |= to == DriverState::Done;
                }
                _ => {}
            }
        }
        assert_eq!(last_rows, 30);
        assert!(saw_done);
    }

    fn paused_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Any finite list, revealed in arbitrary page sizes, is collected
        /// completely and exactly once
        #[test]
        fn prop_finite_list_terminates_with_all_rows(
            n in 0usize..160,
            page_size in 5usize..60,
            load_delay_reads in 1u32..12,
            row_height in 24u32..64,
        ) {
            // Freshly mounted rows stay blank for one read
            let layout = Layout {
                row_height,
                page_size: Some(page_size),
                load_delay_reads,
                paint_delay_reads: 1,
                ..Layout::default()
            };
            let mut view = SimulatedView::new(sim_rows(n), layout);
            let (ctx, _) = context();

            let result = paused_runtime().block_on(
                ScrollDriver::new(policy(), 4).run(&mut view, ctx, headers()),
            );

            let ids: HashSet<&str> = result.rows.iter().map(|r| r.id()).collect();
            prop_assert_eq!(ids.len(), result.rows.len());
            prop_assert_eq!(result.rows.len(), n);
            prop_assert!(!result.cancelled);
            // Bounded: every row costs at most a few scans plus the final stall
            prop_assert!(result.iterations <= (n as u64 + 4) * 3);
        }
    }
}
