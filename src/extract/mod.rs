//! Incremental extraction from virtualized lists
//!
//! # Architecture
//!
//! ```text
//! trigger() → ViewHost::locate → HeaderSet::capture
//!           → ScrollDriver ⇄ ViewportSampler → RowStore
//!           → Serializer → Sink
//! ```
//!
//! `Exporter` is the surface the surrounding tool talks to. A trigger while
//! a run is active is ignored, until that run has fully finished. Each run
//! gets its own active flag; clearing it through a `CancelHandle` ends that
//! run early with whatever rows it has collected and never touches later
//! runs.

pub mod driver;
pub mod headers;
pub mod sampler;
pub mod store;
pub mod view;

use crate::config::{ExtractionConfig, FormatConfig};
use crate::events::{EventChannels, ExportEvent};
use crate::serialize::Serializer;
use crate::sink::{suggested_filename, ExportDocument, Sink};
use chrono::{Local, Utc};
use driver::{RunContext, ScrollDriver};
use headers::HeaderSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use tokio::sync::Mutex;
use view::ViewHost;

/// Settings for an exporter, assembled from the application config
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub extraction: ExtractionConfig,
    pub format: FormatConfig,
    /// Candidate selectors for the scroll target, tried in order
    pub selectors: Vec<String>,
    /// Prefix of the suggested file name
    pub filename_prefix: String,
}

/// Result of a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// A run was already active; the trigger was dropped
    Ignored,
    /// The run finished without a single row
    Empty { cancelled: bool },
    /// Rows were serialized and delivered to the sink
    Exported {
        rows: usize,
        filename: String,
        /// The run was cancelled before completion was detected
        partial: bool,
    },
}

/// Errors surfaced by a trigger
#[derive(Debug)]
pub enum ExportError {
    /// None of the scroll target selectors matched
    NoTarget { selectors: Vec<String> },
    /// The sink refused the document
    Delivery(anyhow::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTarget { selectors } => write!(
                f,
                "No scrollable table found (tried: {})",
                selectors.join(", ")
            ),
            Self::Delivery(e) => write!(f, "Failed to deliver export: {:#}", e),
        }
    }
}

impl std::error::Error for ExportError {}

/// Active flag of the run in progress, `None` between runs
type CurrentRun = Arc<StdMutex<Option<Arc<AtomicBool>>>>;

fn lock_current(
    current: &StdMutex<Option<Arc<AtomicBool>>>,
) -> MutexGuard<'_, Option<Arc<AtomicBool>>> {
    // The slot holds no invariant a panicking holder could break
    current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cancels the run in progress on an exporter
#[derive(Debug, Clone)]
pub struct CancelHandle {
    current: CurrentRun,
}

impl CancelHandle {
    /// Cancel the active run, if any. The run still delivers its partial rows.
    ///
    /// Without an active run this does nothing; it never affects a later run.
    pub fn cancel(&self) {
        if let Some(active) = lock_current(&self.current).as_ref() {
            if active.swap(false, Ordering::AcqRel) {
                tracing::info!("Cancellation requested");
            }
        }
    }
}

/// Releases the busy flag and detaches the run's active flag when the run
/// ends, however it ends
struct RunGuard<'a> {
    busy: &'a AtomicBool,
    current: &'a StdMutex<Option<Arc<AtomicBool>>>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        lock_current(self.current).take();
        self.busy.store(false, Ordering::Release);
    }
}

/// Trigger surface: one run at a time over a host page, delivering to a sink
pub struct Exporter<H: ViewHost, S: Sink> {
    host: Mutex<H>,
    sink: S,
    settings: ExportSettings,
    driver: ScrollDriver,
    serializer: Serializer,
    /// Set from trigger until the run has delivered (or failed)
    busy: AtomicBool,
    current: CurrentRun,
    progress: Arc<AtomicUsize>,
    channels: EventChannels,
}

impl<H: ViewHost, S: Sink> Exporter<H, S> {
    pub fn new(host: H, sink: S, settings: ExportSettings) -> Self {
        let driver = ScrollDriver::new(settings.extraction.clone(), settings.format.column_count);
        let serializer = Serializer::from_config(&settings.format);
        Self {
            host: Mutex::new(host),
            sink,
            settings,
            driver,
            serializer,
            busy: AtomicBool::new(false),
            current: Arc::new(StdMutex::new(None)),
            progress: Arc::new(AtomicUsize::new(0)),
            channels: EventChannels::default(),
        }
    }

    /// Publish run events to `channels`
    pub fn with_channels(mut self, channels: EventChannels) -> Self {
        self.channels = channels;
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            current: self.current.clone(),
        }
    }

    /// Rows collected so far by the active (or last) run
    pub fn progress(&self) -> usize {
        self.progress.load(Ordering::Acquire)
    }

    /// Start an export
    ///
    /// Returns `Ok(ExportOutcome::Ignored)` without side effects while
    /// another run is active.
    pub async fn trigger(&self) -> Result<ExportOutcome, ExportError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Export already running, ignoring trigger");
            return Ok(ExportOutcome::Ignored);
        }
        let active = Arc::new(AtomicBool::new(true));
        *lock_current(&self.current) = Some(active.clone());
        let _guard = RunGuard {
            busy: &self.busy,
            current: &self.current,
        };

        let mut host = self.host.lock().await;
        let Some(view) = host.locate(&self.settings.selectors) else {
            tracing::error!("No scroll target matched {:?}", self.settings.selectors);
            return Err(ExportError::NoTarget {
                selectors: self.settings.selectors.clone(),
            });
        };

        let headers = HeaderSet::capture(view.header_labels(), &self.settings.format);
        tracing::info!("Export started (headers: {})", headers.labels().join(", "));
        self.channels.send(ExportEvent::RunStarted {
            timestamp: Utc::now(),
            headers: headers.labels().to_vec(),
        });

        let ctx = RunContext::new(
            active,
            self.progress.clone(),
            self.channels.clone(),
        );
        let result = self.driver.run(view, ctx, headers).await;
        drop(host);

        self.channels.send(ExportEvent::RunFinished {
            timestamp: Utc::now(),
            rows: result.rows.len(),
            cancelled: result.cancelled,
            iterations: result.iterations,
        });

        if result.rows.is_empty() {
            tracing::info!("Nothing to export");
            return Ok(ExportOutcome::Empty {
                cancelled: result.cancelled,
            });
        }

        let document = ExportDocument {
            filename: suggested_filename(&self.settings.filename_prefix, Local::now().date_naive()),
            text: self.serializer.render(&result.headers, &result.rows),
            rows: result.rows.len(),
        };

        self.sink.deliver(&document).map_err(ExportError::Delivery)?;
        tracing::debug!("Delivered {} via {} sink", document.filename, self.sink.name());
        self.channels.send(ExportEvent::Delivered {
            timestamp: Utc::now(),
            filename: document.filename.clone(),
            bytes: document.text.len(),
        });

        Ok(ExportOutcome::Exported {
            rows: document.rows,
            filename: document.filename,
            partial: result.cancelled,
        })
    }
}
