//! Extraction policy configuration
//!
//! Scroll step, polling cadence and the completion heuristic. The bottom
//! tolerance and empty-scan threshold are tuning knobs, not proven
//! constants: lists that lazily insert rows slowly may need a larger
//! threshold or a longer settle wait.

use serde::Deserialize;
use std::time::Duration;

/// Scroll driver policy
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Pixels to advance per scroll step (never jumps straight to the bottom)
    pub scroll_delta_px: u32,
    /// Pause before each scroll step, letting the current window paint (milliseconds)
    pub scan_delay_ms: u64,
    /// Interval between polls while settling (milliseconds)
    pub poll_interval_ms: u64,
    /// Maximum wait for a scroll step to paint new rows (milliseconds)
    pub max_settle_ms: u64,
    /// Consecutive empty scans at the bottom before the run is complete
    pub empty_scan_threshold: u32,
    /// Slack when deciding whether the viewport touches the extent
    pub bottom_tolerance_px: u32,
    /// Offset movement that ends a settle wait early
    pub settle_progress_px: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            scroll_delta_px: 400,
            scan_delay_ms: 100,
            poll_interval_ms: 100,
            max_settle_ms: 2000,
            empty_scan_threshold: 2,
            bottom_tolerance_px: 2,
            settle_progress_px: 50,
        }
    }
}

/// Extraction settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileExtraction {
    pub scroll_delta_px: Option<u32>,
    pub scan_delay_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub max_settle_ms: Option<u64>,
    pub empty_scan_threshold: Option<u32>,
    pub bottom_tolerance_px: Option<u32>,
    pub settle_progress_px: Option<u32>,
}

impl ExtractionConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileExtraction>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            scroll_delta_px: file
                .scroll_delta_px
                .filter(|&px| px > 0)
                .unwrap_or(defaults.scroll_delta_px),
            scan_delay_ms: file.scan_delay_ms.unwrap_or(defaults.scan_delay_ms),
            poll_interval_ms: file.poll_interval_ms.unwrap_or(defaults.poll_interval_ms),
            max_settle_ms: file.max_settle_ms.unwrap_or(defaults.max_settle_ms),
            // A threshold of zero would finish on the first bottom sighting
            empty_scan_threshold: file
                .empty_scan_threshold
                .unwrap_or(defaults.empty_scan_threshold)
                .max(1),
            bottom_tolerance_px: file
                .bottom_tolerance_px
                .unwrap_or(defaults.bottom_tolerance_px),
            settle_progress_px: file
                .settle_progress_px
                .unwrap_or(defaults.settle_progress_px),
        }
    }

    /// Poll interval, at least one millisecond
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.scan_delay_ms)
    }

    pub fn max_settle(&self) -> Duration {
        Duration::from_millis(self.max_settle_ms)
    }
}
